use std::fmt::{Display, Formatter, Result as FmtResult};

/// Archive formats that carry no standard descriptor and need bespoke
/// extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialCase {
    /// OptiFine ships as a tweak without a descriptor; its identity is taken
    /// from the first line of the bundled changelog.
    OptiFineChangelog,
}

/// The recognized on-disk descriptor formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorShape {
    /// One JSON object describing one mod.
    SingleRecord,
    /// A bare JSON array of records; the first element is authoritative.
    RecordList,
    /// A JSON object with a `modListVersion` marker wrapping a `modList`
    /// array; the first element is authoritative.
    VersionedList,
    /// A non-JSON descriptor handled by dedicated logic.
    SpecialCase(SpecialCase),
    /// No recognizable descriptor found.
    Absent,
}
impl DescriptorShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleRecord => "single-record",
            Self::RecordList => "record-list",
            Self::VersionedList => "versioned-list",
            Self::SpecialCase(SpecialCase::OptiFineChangelog) => "optifine-changelog",
            Self::Absent => "absent",
        }
    }
}

impl Display for DescriptorShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
