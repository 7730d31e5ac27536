use crate::consts::UNKNOWN_VERSION;
use serde::{Deserialize, Serialize};

/// The resolved identity of a single mod archive.
///
/// Produced once per archive and never mutated afterwards. Every field is
/// usable as-is: `id` is lower-case and non-empty, and `version` never holds
/// an unresolved build template token (those are replaced by `"0.0.0"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModMetadata {
    /// Stable, lower-case identifier of the mod
    pub id: String,
    /// Human-readable display name
    pub name: String,
    /// Mod version, or `"0.0.0"` when unknown
    pub version: String,
    /// Platform version the archive targets. Derived, not authoritative, and
    /// only known for special-cased archives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_version: Option<String>,
}

impl ModMetadata {
    /// Synthesizes a record for an archive without a usable descriptor.
    ///
    /// The id is the logical name without its extension, lower-cased; the
    /// display name is the logical name unmodified.
    ///
    /// ```rust
    /// use modmeta_descriptor::models::ModMetadata;
    ///
    /// let metadata = ModMetadata::fallback("BetterFoliage-1.12.jar");
    /// assert_eq!(metadata.id, "betterfoliage-1.12");
    /// assert_eq!(metadata.name, "BetterFoliage-1.12.jar");
    /// assert_eq!(metadata.version, "0.0.0");
    /// ```
    pub fn fallback(name: &str) -> Self {
        let stem = match name.rsplit_once('.') {
            Some((stem, _extension)) if !stem.is_empty() => stem,
            _ => name,
        };
        Self {
            id: stem.to_lowercase(),
            name: name.to_string(),
            version: UNKNOWN_VERSION.to_string(),
            platform_version: None,
        }
    }

    /// Returns `true` if the version could not be determined.
    pub fn has_unknown_version(&self) -> bool {
        self.version == UNKNOWN_VERSION
    }
}
