//! Zip-backed archive source.
//!
//! Jar files are zip files, so this covers every mod archive format the
//! resolver deals with. The `zip` crate is synchronous; all file access runs
//! inside [`spawn_blocking`](tokio::task::spawn_blocking).

use crate::error::{ErrorKind, Result};
use crate::source::{ArchiveReader, ArchiveSource};
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::instrument;
use zip::ZipArchive;
use zip::result::ZipError;

/// Opens zip and jar archives from the local filesystem.
#[derive(Clone)]
pub struct ZipSource {
    name: String,
}
impl ZipSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
impl Default for ZipSource {
    fn default() -> Self {
        Self::new("zip")
    }
}

#[async_trait]
impl ArchiveSource for ZipSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(source = %self.name, path = %path.display()))]
    async fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>> {
        let owned = path.to_path_buf();
        let archive = tokio::task::spawn_blocking(move || -> Result<ZipArchive<File>> {
            let file = File::open(&owned).or_raise(|| ErrorKind::ArchiveOpen(owned.clone()))?;
            ZipArchive::new(file).or_raise(|| ErrorKind::ArchiveOpen(owned.clone()))
        })
        .await
        .or_raise(|| ErrorKind::ArchiveOpen(path.to_path_buf()))??;
        tracing::trace!(entries = archive.len(), "Opened zip archive");
        Ok(Box::new(ZipReader {
            path: path.to_path_buf(),
            archive: Arc::new(Mutex::new(archive)),
        }))
    }
}

/// Handle to an opened zip archive.
///
/// The archive sits behind an `Arc<Mutex<_>>` only so it can be moved into a
/// blocking task for each read; there is never more than one reader per
/// handle.
struct ZipReader {
    path: PathBuf,
    archive: Arc<Mutex<ZipArchive<File>>>,
}

#[async_trait]
impl ArchiveReader for ZipReader {
    fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read_entry(&mut self, entry: &str) -> Result<Vec<u8>> {
        let archive = Arc::clone(&self.archive);
        let name = entry.to_string();
        tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let mut guard = archive.lock().map_err(|_| ErrorKind::EntryRead(name.clone()))?;
            let mut file = match guard.by_name(&name) {
                Ok(file) => file,
                Err(ZipError::FileNotFound) => exn::bail!(ErrorKind::EntryNotFound(name)),
                Err(err) => return Err(err).or_raise(|| ErrorKind::EntryRead(name.clone())),
            };
            let mut buffer = Vec::new();
            file.read_to_end(&mut buffer).or_raise(|| ErrorKind::EntryRead(name.clone()))?;
            Ok(buffer)
        })
        .await
        .or_raise(|| ErrorKind::EntryRead(entry.to_string()))?
    }
}
