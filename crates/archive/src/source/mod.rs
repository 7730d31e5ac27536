//! Archive source trait and implementations.
//!
//! This module defines the [`ArchiveSource`] trait, which opens mod archives
//! by path, and the [`ArchiveReader`] handle it returns for reading named
//! entries out of an opened archive.

#[cfg(feature = "mock")]
mod mock;
mod zipfile;

#[cfg(feature = "mock")]
pub use self::mock::{MockArchive, MockSource};
pub use self::zipfile::ZipSource;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Opens archives for reading.
///
/// Opening is asynchronous because it touches the filesystem (and, for
/// zip-based archives, has to parse the central directory before any entry
/// can be read).
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use modmeta_archive::{ArchiveSource, ZipSource};
/// # async fn example() -> modmeta_archive::error::Result<()> {
/// let source = ZipSource::default();
/// let mut archive = source.open(Path::new("mods/JustEnoughItems-1.12.2.jar")).await?;
/// let descriptor = archive.read_entry("mcmod.info").await?;
/// println!("{} bytes", descriptor.len());
/// // Dropping the handle closes the archive.
/// drop(archive);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Name of the source, used for logging only.
    fn name(&self) -> &str;

    /// Open the archive at `path`.
    ///
    /// Returns [`ArchiveOpen`](crate::error::ErrorKind::ArchiveOpen) if the
    /// file is missing, unreadable, or not a valid archive container.
    async fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>>;
}

/// An opened archive.
///
/// The handle owns the underlying file; it is closed when the handle is
/// dropped.
#[async_trait]
pub trait ArchiveReader: Send {
    /// Path the archive was opened from.
    fn path(&self) -> &Path;

    /// Read the complete contents of a named entry.
    ///
    /// Returns [`EntryNotFound`](crate::error::ErrorKind::EntryNotFound) if
    /// the archive has no entry with that name, or
    /// [`EntryRead`](crate::error::ErrorKind::EntryRead) if the entry exists
    /// but could not be read.
    async fn read_entry(&mut self, entry: &str) -> Result<Vec<u8>>;
}
