//! Descriptor Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A descriptor error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for descriptor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A descriptor entry that has no sensible default could not be read
    /// from the archive.
    #[display("failed to read required descriptor entry: {_0}")]
    DescriptorRead(#[error(not(source))] &'static str),
    /// The descriptor bytes could not be decoded into a usable record.
    ///
    /// Never escapes [`normalize()`](crate::normalize); it is logged and the
    /// fallback record is used instead.
    #[display("malformed descriptor: {_0}")]
    MalformedDescriptor(#[error(not(source))] String),
    /// A platform version string did not look like `1.12` or `1.12.2`.
    #[display("invalid platform version: {_0}")]
    InvalidPlatformVersion(#[error(not(source))] String),
}
