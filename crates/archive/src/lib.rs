//! Archive collaborator for mod metadata resolution.
//!
//! Opening an archive yields a boxed [`ArchiveReader`] handle. The handle is
//! a scoped resource: dropping it releases the underlying file, so every exit
//! path out of a parse attempt (including `?` early-returns) closes the
//! archive.

pub mod error;
pub mod source;

pub use crate::source::{ArchiveReader, ArchiveSource, ZipSource};
use std::sync::Arc;

pub type SourceHandle = Arc<dyn ArchiveSource + Send + Sync>;
