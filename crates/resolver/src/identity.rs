//! Module identity derived from resolved metadata.

use modmeta_descriptor::models::ModMetadata;

/// Artifact extension used in generated maven identifiers.
pub const MAVEN_EXTENSION: &str = "jar";

/// Builds a maven-style identifier, `group:id:version@jar`.
///
/// ```rust
/// use modmeta_descriptor::models::ModMetadata;
/// use modmeta_resolver::maven_identifier;
///
/// let metadata = ModMetadata {
///     id: "jei".to_string(),
///     name: "JustEnoughItems".to_string(),
///     version: "4.8.0".to_string(),
///     platform_version: None,
/// };
/// assert_eq!(maven_identifier("generated.localfiles", &metadata), "generated.localfiles:jei:4.8.0@jar");
/// ```
pub fn maven_identifier(group: &str, metadata: &ModMetadata) -> String {
    format!("{group}:{}:{}@{MAVEN_EXTENSION}", metadata.id, metadata.version)
}

/// Upper-cases the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("justEnoughItems", "JustEnoughItems")]
    #[case("OptiFine_1.12.2_HD_U_F5", "OptiFine_1.12.2_HD_U_F5")]
    #[case("ßig", "SSig")]
    #[case("x", "X")]
    #[case("", "")]
    fn test_capitalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(capitalize(input), expected);
    }
}
