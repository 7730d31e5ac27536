//! Server manifest fragment.
//!
//! Produces the per-server metadata object that is forwarded to a launcher's
//! distribution file. The values generated here are placeholders meant to be
//! edited by hand before publishing.

pub mod error;

use exn::ResultExt;
use modmeta_config::Config;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ErrorKind, Result};

pub const DEFAULT_META_VERSION: &str = "1.0.0";
pub const DEFAULT_ADDRESS: &str = "localhost:25565";
pub const DISCORD_PLACEHOLDER: &str = "<FILL IN OR REMOVE DISCORD OBJECT>";

/// Patterns for files a launcher should not track, scoped to a subdirectory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UntrackedFilesOption {
    /// The subdirectory the patterns apply to, e.g. `["files", "forgemods"]`.
    pub applies_to: Vec<String>,
    /// Glob patterns matched against each file.
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discord {
    pub short_id: String,
    pub large_image_text: String,
    pub large_image_key: String,
}
impl Discord {
    fn placeholder() -> Self {
        Self {
            short_id: DISCORD_PLACEHOLDER.to_string(),
            large_image_text: DISCORD_PLACEHOLDER.to_string(),
            large_image_key: DISCORD_PLACEHOLDER.to_string(),
        }
    }
}

/// Server metadata forwarded to the distribution file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub version: String,
    pub name: String,
    pub description: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<Discord>,
    pub main_server: bool,
    pub server_code: String,
    pub autoconnect: bool,
}

/// A mod-loader version, without the platform version (e.g. `14.23.5.2854`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderVersion {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMeta {
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forge: Option<LoaderVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liteloader: Option<LoaderVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untracked_files: Option<Vec<UntrackedFilesOption>>,
}
impl ServerMeta {
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).or_raise(|| ErrorKind::Serialize)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerMetaOptions {
    pub forge_version: Option<String>,
    pub liteloader_version: Option<String>,
}
impl From<&Config> for ServerMetaOptions {
    fn from(config: &Config) -> Self {
        Self {
            forge_version: config.loader.forge.clone(),
            liteloader_version: config.loader.liteloader.clone(),
        }
    }
}

/// Builds the default manifest fragment for a server.
///
/// # Examples
///
/// ```rust
/// use modmeta_servermeta::{ServerMetaOptions, default_server_meta};
///
/// let options = ServerMetaOptions {
///     forge_version: Some("14.23.5.2854".to_string()),
///     liteloader_version: None,
/// };
/// let meta = default_server_meta("Example", "1.12.2", &options);
/// assert_eq!(meta.meta.name, "Example (Minecraft 1.12.2)");
/// assert_eq!(meta.meta.description, "Example Running Minecraft 1.12.2 (Forge v14.23.5.2854)");
/// assert_eq!(meta.untracked_files, Some(vec![]));
/// ```
#[instrument(skip(options))]
pub fn default_server_meta(id: &str, version: &str, options: &ServerMetaOptions) -> ServerMeta {
    let mut description = format!("{id} Running Minecraft {version}");
    let forge = options.forge_version.as_ref().filter(|v| !v.is_empty()).map(|forge| {
        description.push_str(&format!(" (Forge v{forge})"));
        LoaderVersion { version: forge.clone() }
    });
    let liteloader = options.liteloader_version.as_ref().filter(|v| !v.is_empty()).map(|liteloader| {
        description.push_str(&format!(" (Liteloader v{liteloader})"));
        LoaderVersion { version: liteloader.clone() }
    });
    ServerMeta {
        meta: Meta {
            version: DEFAULT_META_VERSION.to_string(),
            name: format!("{id} (Minecraft {version})"),
            description,
            address: DEFAULT_ADDRESS.to_string(),
            discord: Some(Discord::placeholder()),
            main_server: false,
            server_code: String::new(),
            autoconnect: false,
        },
        forge,
        liteloader,
        untracked_files: Some(Vec::new()),
    }
}
