//! Descriptor decoding and normalization.

use exn::{OptionExt, ResultExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::consts::{
    CHANGES_SUFFIX_REGEX, MOD_LIST_FIELD, MOD_LIST_VERSION_FIELD, OPTIFINE_DISPLAY_NAME, OPTIFINE_HEADER_REGEX,
    OPTIFINE_ID, UNKNOWN_VERSION, UTF8_BOM,
};
use crate::error::{ErrorKind, Result};
use crate::locate::RawDescriptor;
use crate::models::{DescriptorShape, ModMetadata, SpecialCase};

/// A successfully decoded standard descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub shape: DescriptorShape,
    pub metadata: ModMetadata,
}

/// The authoritative record of a standard descriptor. Unknown fields
/// (`description`, `authorList`, `mcversion`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct Record {
    modid: String,
    name: String,
    version: String,
}

/// Turns a located descriptor into a normalized record.
///
/// Never fails: a standard descriptor that is absent or cannot be decoded is
/// logged and replaced by [`ModMetadata::fallback`].
#[instrument(skip(descriptor), fields(shape))]
pub fn normalize(descriptor: RawDescriptor, name: &str) -> ModMetadata {
    let (shape, metadata) = match descriptor {
        RawDescriptor::Special(SpecialCase::OptiFineChangelog, changelog) => {
            (DescriptorShape::SpecialCase(SpecialCase::OptiFineChangelog), self::optifine(&changelog, name))
        },
        RawDescriptor::Standard(bytes) => match self::decode(&bytes) {
            Ok(decoded) => (decoded.shape, decoded.metadata),
            Err(err) => {
                tracing::warn!(error = ?err, "Mod contains an invalid descriptor; using defaults");
                (DescriptorShape::Absent, ModMetadata::fallback(name))
            },
        },
        RawDescriptor::Absent => {
            tracing::warn!("Mod does not contain a descriptor; using defaults");
            (DescriptorShape::Absent, ModMetadata::fallback(name))
        },
    };
    tracing::Span::current().record("shape", shape.as_str());
    metadata
}

/// Decodes a standard JSON descriptor.
///
/// The shape is classified once, in order: an object carrying the
/// `modListVersion` marker is a [`VersionedList`](DescriptorShape::VersionedList),
/// an array is a [`RecordList`](DescriptorShape::RecordList), and any other
/// object is a [`SingleRecord`](DescriptorShape::SingleRecord). For lists only
/// the first record is kept.
///
/// # Examples
///
/// ```rust
/// use modmeta_descriptor::decode;
/// use modmeta_descriptor::models::DescriptorShape;
///
/// let decoded = decode(br#"[{"modid":"foo","name":"Foo","version":"${version}"}]"#).unwrap();
/// assert_eq!(decoded.shape, DescriptorShape::RecordList);
/// assert_eq!(decoded.metadata.version, "0.0.0");
/// ```
#[instrument(level = "trace", skip(bytes), fields(size = bytes.len()))]
pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let value: Value = serde_json::from_slice(bytes).or_raise(|| malformed("not valid JSON"))?;
    let (shape, record) = match value {
        Value::Object(mut map) if map.contains_key(MOD_LIST_VERSION_FIELD) => {
            let list = match map.remove(MOD_LIST_FIELD) {
                Some(Value::Array(list)) => list,
                _ => exn::bail!(malformed("versioned list without a mod list array")),
            };
            (DescriptorShape::VersionedList, self::first(list)?)
        },
        Value::Array(list) => (DescriptorShape::RecordList, self::first(list)?),
        Value::Object(map) => (DescriptorShape::SingleRecord, Value::Object(map)),
        _ => exn::bail!(malformed("expected an object or an array")),
    };
    let record: Record = serde_json::from_value(record).or_raise(|| malformed("record is missing required fields"))?;
    Ok(Decoded { shape, metadata: self::record_metadata(record)? })
}

fn first(list: Vec<Value>) -> Result<Value> {
    list.into_iter().next().ok_or_raise(|| malformed("empty mod list"))
}

fn record_metadata(record: Record) -> Result<ModMetadata> {
    let id = record.modid.trim().to_lowercase();
    if id.is_empty() {
        exn::bail!(malformed("empty modid"));
    }
    if record.name.trim().is_empty() {
        exn::bail!(malformed("empty name"));
    }
    Ok(ModMetadata {
        id,
        name: record.name,
        // An empty version is deliberately kept as-is; only template tokens
        // and snapshot markers are replaced.
        version: sanitize_version(record.version),
        platform_version: None,
    })
}

fn malformed(reason: &str) -> ErrorKind {
    ErrorKind::MalformedDescriptor(reason.to_string())
}

/// Replaces versions that still hold an unresolved build template token
/// (`@VERSION@`, `${version}`) or a snapshot marker with `"0.0.0"`.
///
/// ```rust
/// use modmeta_descriptor::sanitize_version;
///
/// assert_eq!(sanitize_version("4.8.0".to_string()), "4.8.0");
/// assert_eq!(sanitize_version("@VERSION@".to_string()), "0.0.0");
/// assert_eq!(sanitize_version("1.0-SNAPSHOT".to_string()), "0.0.0");
/// ```
pub fn sanitize_version(version: String) -> String {
    if version.contains('@') || version.contains('$') || version.contains("SNAPSHOT") {
        UNKNOWN_VERSION.to_string()
    } else {
        version
    }
}

/// Builds a record from OptiFine's changelog.
///
/// The first non-blank line is the header: either `OptiFine 1.12.2_HD_U_F5`
/// or `OptiFine_1.12.2_HD_U_F5`, optionally followed by `changes:`. The
/// header is the display name; the version is its second word, or for the
/// underscore form everything after the first `_`. The platform version is
/// the mod version up to its first `_`.
///
/// A changelog without a header is read as if the archive's logical name,
/// minus its extension, were the header.
fn optifine(changelog: &[u8], name: &str) -> ModMetadata {
    let text = String::from_utf8_lossy(changelog);
    let header = text
        .lines()
        .map(|line| CHANGES_SUFFIX_REGEX.replace(line.trim(), "").trim().to_string())
        .find(|header| !header.is_empty())
        .unwrap_or_else(|| {
            tracing::warn!("OptiFine changelog has no header; using the archive name");
            let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem).trim();
            let header = if stem.is_empty() { OPTIFINE_DISPLAY_NAME } else { stem };
            header.to_string()
        });
    let header = header.as_str();
    let version = header
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
        .or_else(|| {
            OPTIFINE_HEADER_REGEX.captures(header).and_then(|captures| captures.get(1)).map(|m| m.as_str().to_string())
        })
        .map(sanitize_version)
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
    let platform_version = version.split_once('_').map(|(platform, _)| platform.to_string());
    ModMetadata {
        id: OPTIFINE_ID.to_string(),
        name: header.to_string(),
        version,
        platform_version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn metadata(id: &str, name: &str, version: &str) -> ModMetadata {
        ModMetadata {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            platform_version: None,
        }
    }

    #[test]
    fn test_versioned_list() {
        let json = br#"{"modListVersion":1,"modList":[{"modid":"jei","name":"JustEnoughItems","version":"4.8.0"}]}"#;
        let decoded = decode(json).unwrap();
        assert_eq!(decoded.shape, DescriptorShape::VersionedList);
        assert_eq!(decoded.metadata, metadata("jei", "JustEnoughItems", "4.8.0"));
    }

    #[test]
    fn test_record_list_with_template_version() {
        let decoded = decode(br#"[{"modid":"foo","name":"Foo","version":"${version}"}]"#).unwrap();
        assert_eq!(decoded.shape, DescriptorShape::RecordList);
        assert_eq!(decoded.metadata, metadata("foo", "Foo", "0.0.0"));
    }

    #[test]
    fn test_single_record() {
        let decoded = decode(br#"{"modid":"Chisel","name":"Chisel","version":"0.2.1","mcversion":"1.12.2"}"#).unwrap();
        assert_eq!(decoded.shape, DescriptorShape::SingleRecord);
        assert_eq!(decoded.metadata, metadata("chisel", "Chisel", "0.2.1"));
    }

    #[test]
    fn test_list_shapes_normalize_identically() {
        let record = r#"{"modid":"ic2","name":"IndustrialCraft 2","version":"2.8.170-ex112"}"#;
        let second = r#"{"modid":"ic2-api","name":"IC2 API","version":"1.0"}"#;
        let versioned = format!(r#"{{"modListVersion":2,"modList":[{record},{second}]}}"#);
        let list = format!("[{record},{second}]");
        let versioned = decode(versioned.as_bytes()).unwrap();
        let list = decode(list.as_bytes()).unwrap();
        assert_eq!(versioned.shape, DescriptorShape::VersionedList);
        assert_eq!(list.shape, DescriptorShape::RecordList);
        assert_eq!(versioned.metadata, list.metadata);
        assert_eq!(list.metadata, metadata("ic2", "IndustrialCraft 2", "2.8.170-ex112"));
    }

    #[rstest]
    #[case("@VERSION@", "0.0.0")]
    #[case("${version}", "0.0.0")]
    #[case("1.0.0-SNAPSHOT", "0.0.0")]
    #[case("user@host", "0.0.0")]
    #[case("1.12.2-14.23.5.2854", "1.12.2-14.23.5.2854")]
    #[case("snapshot", "snapshot")]
    #[case("", "")]
    fn test_sanitize_version(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_version(input.to_string()), expected);
        let json = format!(r#"[{{"modid":"m","name":"M","version":"{input}"}}]"#);
        assert_eq!(decode(json.as_bytes()).unwrap().metadata.version, expected);
    }

    #[test]
    fn test_empty_version_is_preserved() {
        let decoded = decode(br#"[{"modid":"m","name":"M","version":""}]"#).unwrap();
        assert_eq!(decoded.metadata.version, "");
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let decoded = decode(b"\xEF\xBB\xBF[{\"modid\":\"bom\",\"name\":\"Bom\",\"version\":\"1\"}]").unwrap();
        assert_eq!(decoded.metadata, metadata("bom", "Bom", "1"));
    }

    #[rstest]
    #[case::not_json(&b"{ this is not json"[..])]
    #[case::empty(&b""[..])]
    #[case::empty_list(&b"[]"[..])]
    #[case::empty_mod_list(&br#"{"modListVersion":1,"modList":[]}"#[..])]
    #[case::mod_list_not_array(&br#"{"modListVersion":1,"modList":{}}"#[..])]
    #[case::missing_mod_list(&br#"{"modListVersion":1}"#[..])]
    #[case::scalar(&b"42"[..])]
    #[case::missing_version(&br#"[{"modid":"m","name":"M"}]"#[..])]
    #[case::missing_modid(&br#"[{"name":"M","version":"1"}]"#[..])]
    #[case::empty_modid(&br#"[{"modid":"","name":"M","version":"1"}]"#[..])]
    #[case::blank_name(&br#"[{"modid":"m","name":"  ","version":"1"}]"#[..])]
    #[case::wrong_types(&br#"[{"modid":1,"name":"M","version":"1"}]"#[..])]
    #[case::first_element_not_object(&br#"["m", {"modid":"m","name":"M","version":"1"}]"#[..])]
    fn test_decode_malformed(#[case] bytes: &[u8]) {
        let err = decode(bytes).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedDescriptor(_)));
    }

    #[rstest]
    #[case::malformed(RawDescriptor::Standard(Vec::from(*b"[{]")))]
    #[case::absent(RawDescriptor::Absent)]
    fn test_normalize_falls_back(#[case] descriptor: RawDescriptor) {
        let normalized = normalize(descriptor, "SomeMod-1.2.3.jar");
        assert_eq!(normalized, metadata("somemod-1.2.3", "SomeMod-1.2.3.jar", "0.0.0"));
    }

    #[test]
    fn test_normalize_standard() {
        let descriptor = RawDescriptor::Standard(Vec::from(*br#"[{"modid":"jei","name":"JEI","version":"4.8.0"}]"#));
        assert_eq!(normalize(descriptor, "jei.jar"), metadata("jei", "JEI", "4.8.0"));
    }

    #[rstest]
    #[case::underscore_header(
        "OptiFine_1.12.2_HD_U_F5 changes:\nfixed things\n",
        "OptiFine_1.12.2_HD_U_F5",
        "1.12.2_HD_U_F5",
        Some("1.12.2")
    )]
    #[case::spaced_header(
        "OptiFine 1.12.2_HD_U_F5\r\n\r\nChanges:\n",
        "OptiFine 1.12.2_HD_U_F5",
        "1.12.2_HD_U_F5",
        Some("1.12.2")
    )]
    #[case::leading_blank_line(
        "\n  \nOptiFine 1.12.2_HD_U_F5\n",
        "OptiFine 1.12.2_HD_U_F5",
        "1.12.2_HD_U_F5",
        Some("1.12.2")
    )]
    #[case::empty("", "OptiFine_1.12.2_HD_U_F5", "1.12.2_HD_U_F5", Some("1.12.2"))]
    #[case::blank(" \n\t\r\n", "OptiFine_1.12.2_HD_U_F5", "1.12.2_HD_U_F5", Some("1.12.2"))]
    #[case::padded("   OptiFine 1.7.10_HD_U_E7   \n", "OptiFine 1.7.10_HD_U_E7", "1.7.10_HD_U_E7", Some("1.7.10"))]
    #[case::no_underscore("OptiFine preview\n", "OptiFine preview", "preview", None)]
    #[case::no_version("OptiFine\n", "OptiFine", "0.0.0", None)]
    fn test_optifine(
        #[case] changelog: &str,
        #[case] name: &str,
        #[case] version: &str,
        #[case] platform_version: Option<&str>,
    ) {
        let descriptor = RawDescriptor::Special(SpecialCase::OptiFineChangelog, changelog.as_bytes().to_vec());
        let normalized = normalize(descriptor, "OptiFine_1.12.2_HD_U_F5.jar");
        assert_eq!(
            normalized,
            ModMetadata {
                id: "optifine".to_string(),
                name: name.to_string(),
                version: version.to_string(),
                platform_version: platform_version.map(str::to_string),
            }
        );
    }

    #[rstest]
    #[case::no_extension("optifine", "optifine", "0.0.0")]
    #[case::empty_name("", "OptiFine", "0.0.0")]
    #[case::extension_only(".jar", "OptiFine", "0.0.0")]
    fn test_optifine_without_header(#[case] archive_name: &str, #[case] name: &str, #[case] version: &str) {
        let descriptor = RawDescriptor::Special(SpecialCase::OptiFineChangelog, Vec::new());
        let normalized = normalize(descriptor, archive_name);
        assert_eq!(normalized.id, "optifine");
        assert_eq!(normalized.name, name);
        assert_eq!(normalized.version, version);
        assert!(!normalized.name.is_empty());
    }
}
