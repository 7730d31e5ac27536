//! Resolver Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.
//!
//! A failed resolution is shared by every caller that was waiting on it.
//! Each of them receives its own [`Error`], rebuilt from the shared one with
//! [`replay()`] so the whole error tree survives.

use derive_more::{Display, Error};
use exn::{Exn, Frame};
use std::path::PathBuf;

/// A resolver error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The archive could not be opened or is not a valid container. Report
    /// it and move on to the next archive.
    #[display("unable to open archive: {}", _0.display())]
    ArchiveOpen(#[error(not(source))] PathBuf),
    /// A special-cased archive is missing the entry its identity is read
    /// from.
    #[display("unable to read required descriptor for: {_0}")]
    DescriptorRead(#[error(not(source))] String),
    /// No registered descriptor policy handles the requested platform
    /// version.
    #[display("no descriptor policy for platform version {_0}")]
    NoApplicablePolicy(#[error(not(source))] String),
}

/// A frame copied out of a shared error tree, kept by its message.
#[derive(Debug, Display, Error)]
#[display("{_0}")]
pub struct Cause(#[error(not(source))] String);

/// Rebuilds a shared failure as a new [`Error`] with the same kind and the
/// same tree of causes beneath it.
pub(crate) fn replay(failure: &Error) -> Error {
    Exn::raise_all::<Cause, _>((**failure).clone(), failure.frame().children().iter().map(replay_frame))
}

fn replay_frame(frame: &Frame) -> Exn<Cause> {
    Exn::raise_all::<Cause, _>(Cause(frame.to_string()), frame.children().iter().map(replay_frame))
}
