use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::consts::PLATFORM_VERSION_REGEX;
use crate::error::{Error, ErrorKind};

/// A game platform version such as `1.12.2` or `1.7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
}
impl PlatformVersion {
    pub fn new(major: u32, minor: u32, patch: Option<u32>) -> Self {
        Self { major, minor, patch }
    }

    /// Returns `true` if this is a `1.x` version whose minor component is one
    /// of `minors`.
    ///
    /// ```rust
    /// use modmeta_descriptor::models::PlatformVersion;
    ///
    /// let version: PlatformVersion = "1.12.2".parse().unwrap();
    /// assert!(version.is_release_minor_in(&[7, 8, 9, 10, 11, 12]));
    /// assert!(!version.is_release_minor_in(&[13, 14]));
    /// ```
    pub fn is_release_minor_in(&self, minors: &[u32]) -> bool {
        self.major == 1 && minors.contains(&self.minor)
    }
}

impl FromStr for PlatformVersion {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ErrorKind::InvalidPlatformVersion(s.to_string());
        let Some(captures) = PLATFORM_VERSION_REGEX.captures(s.trim()) else {
            exn::bail!(invalid());
        };
        let component = |index: usize| -> Result<Option<u32>, Error> {
            captures.get(index).map(|m| m.as_str().parse::<u32>()).transpose().map_err(|_| Error::from(invalid()))
        };
        Ok(Self {
            major: component(1)?.ok_or_else(|| Error::from(invalid()))?,
            minor: component(2)?.ok_or_else(|| Error::from(invalid()))?,
            patch: component(3)?,
        })
    }
}

impl Display for PlatformVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}
