//! Server Manifest Error Types

use derive_more::{Display, Error};

/// A server manifest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for server manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The manifest could not be encoded as JSON.
    #[display("failed to serialize server manifest")]
    Serialize,
}
