//! Configuration Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// One of the configuration sources could not be read or merged.
    #[display("unable to load configuration")]
    Load,
    /// The configuration loaded, but a value is unusable.
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] String),
}
