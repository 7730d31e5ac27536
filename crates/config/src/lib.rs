//! Layered configuration for modmeta.
//!
//! Values are merged, lowest priority first, from:
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, chosen by extension), and
//! 3. environment variables prefixed with `MODMETA_` (nested keys are
//!    separated by a double underscore, e.g. `MODMETA_LOADER__FORGE`).

pub mod error;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use modmeta_descriptor::models::PlatformVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::{ErrorKind, Result};

pub const ENV_PREFIX: &str = "MODMETA_";
pub const DEFAULT_PLATFORM_VERSION: &str = "1.12.2";
pub const DEFAULT_MAVEN_GROUP: &str = "generated.localfiles";
pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 8;

/// Mod-loader library versions installed on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Forge version, without the platform version (e.g. `14.23.5.2854`).
    pub forge: Option<String>,
    pub liteloader: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform (game) version the mods are resolved for.
    pub platform_version: String,
    pub loader: LoaderConfig,
    /// Maven group used when generating module identifiers.
    pub maven_group: String,
    /// Maximum number of archives resolved at once during a batch.
    pub resolve_concurrency: usize,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            platform_version: DEFAULT_PLATFORM_VERSION.to_string(),
            loader: LoaderConfig::default(),
            maven_group: DEFAULT_MAVEN_GROUP.to_string(),
            resolve_concurrency: DEFAULT_RESOLVE_CONCURRENCY,
        }
    }
}

impl Config {
    /// Location of the per-user configuration file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "modmeta").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Builds the layered [`Figment`] without extracting it.
    ///
    /// When `file` is `None`, the [default path](Self::default_path) is used
    /// if it exists.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let file = file.map(Path::to_path_buf).or_else(|| Self::default_path().filter(|path| path.exists()));
        if let Some(file) = file {
            figment = match file.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase).as_deref() {
                Some("toml") => figment.merge(Toml::file_exact(&file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(&file)),
                Some("json") => figment.merge(Json::file_exact(&file)),
                _ => exn::bail!(ErrorKind::Invalid(format!("unsupported configuration file: {}", file.display()))),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Loads and validates configuration from all sources.
    #[instrument]
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(file)?)
    }

    /// Extracts and validates configuration from an already-built
    /// [`Figment`].
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(
            platform_version = %config.platform_version,
            forge = ?config.loader.forge,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.platform()?;
        if self.maven_group.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("maven_group must not be empty".to_string()));
        }
        if self.resolve_concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("resolve_concurrency must be at least 1".to_string()));
        }
        Ok(())
    }

    /// The configured platform version, parsed.
    pub fn platform(&self) -> Result<PlatformVersion> {
        self.platform_version
            .parse::<PlatformVersion>()
            .or_raise(|| ErrorKind::Invalid(format!("platform_version: {}", self.platform_version)))
    }

    /// The mod-loader library version consulted when selecting a descriptor
    /// policy; empty when no loader is configured.
    pub fn library_version(&self) -> &str {
        self.loader.forge.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::from_figment(Figment::from(Serialized::defaults(Config::default()))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.platform().unwrap(), PlatformVersion::new(1, 12, Some(2)));
        assert_eq!(config.library_version(), "");
    }

    #[test]
    fn test_merge_toml_string() {
        let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(
            r#"
            platform_version = "1.7.10"
            maven_group = "com.example"

            [loader]
            forge = "10.13.4.1614"
            "#,
        ));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.platform_version, "1.7.10");
        assert_eq!(config.maven_group, "com.example");
        assert_eq!(config.library_version(), "10.13.4.1614");
        assert_eq!(config.loader.liteloader, None);
        assert_eq!(config.resolve_concurrency, DEFAULT_RESOLVE_CONCURRENCY);
    }

    #[rstest]
    #[case("config.toml", "platform_version = \"1.8.9\"\nresolve_concurrency = 2\n")]
    #[case("config.yaml", "platform_version: \"1.8.9\"\nresolve_concurrency: 2\n")]
    #[case("config.json", r#"{"platform_version": "1.8.9", "resolve_concurrency": 2}"#)]
    fn test_load_file(#[case] file_name: &str, #[case] contents: &str) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(file_name);
        std::fs::write(&path, contents).unwrap();
        let config = Config::from_figment(Config::figment(Some(&path)).unwrap()).unwrap();
        assert_eq!(config.platform_version, "1.8.9");
        assert_eq!(config.resolve_concurrency, 2);
        assert_eq!(config.maven_group, DEFAULT_MAVEN_GROUP);
    }

    #[test]
    fn test_unsupported_file_extension() {
        let err = Config::figment(Some(Path::new("config.ini"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_missing_file_fails_to_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.toml");
        let err = Config::from_figment(Config::figment(Some(&path)).unwrap()).unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
    }

    #[rstest]
    #[case::bad_platform(r#"platform_version = "latest""#)]
    #[case::empty_group(r#"maven_group = "  ""#)]
    #[case::zero_concurrency("resolve_concurrency = 0")]
    fn test_invalid_values(#[case] toml: &str) {
        let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(toml));
        let err = Config::from_figment(figment).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }
}
