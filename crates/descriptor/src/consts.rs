use regex::Regex;
use std::sync::LazyLock;

/// Version substituted for anything that cannot be used for ordering or as
/// part of an identifier.
pub const UNKNOWN_VERSION: &str = "0.0.0";
/// Canonical id of the OptiFine tweak.
pub const OPTIFINE_ID: &str = "optifine";

pub(crate) const LEGACY_DESCRIPTOR_ENTRY: &str = "mcmod.info";
pub(crate) const OPTIFINE_CHANGELOG_ENTRY: &str = "changelog.txt";
pub(crate) const OPTIFINE_NAME_PATTERN: &str = "optifine";
pub(crate) const OPTIFINE_DISPLAY_NAME: &str = "OptiFine";
pub(crate) const MOD_LIST_VERSION_FIELD: &str = "modListVersion";
pub(crate) const MOD_LIST_FIELD: &str = "modList";
pub(crate) const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(PLATFORM_VERSION_REGEX, r"^(\d+)\.(\d+)(?:\.(\d+))?$");
regex!(CHANGES_SUFFIX_REGEX, r"(?i)\s+changes:$");
regex!(OPTIFINE_HEADER_REGEX, r"(?i)^optifine_(\S+)$");
