//! Archive Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The archive does not exist, cannot be read, or is not a valid container.
    #[display("unable to open archive: {}", _0.display())]
    ArchiveOpen(#[error(not(source))] PathBuf),
    /// The archive was opened but has no entry with the requested name.
    #[display("entry not found in archive: {_0}")]
    EntryNotFound(#[error(not(source))] String),
    /// The entry exists but its contents could not be read or decompressed.
    #[display("unable to read archive entry: {_0}")]
    EntryRead(#[error(not(source))] String),
}
