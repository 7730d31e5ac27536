//! In-memory archive source for testing.

use crate::error::{ErrorKind, Result};
use crate::source::{ArchiveReader, ArchiveSource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Contents of a single mock archive.
#[derive(Clone, Debug)]
pub enum MockArchive {
    /// A readable archive holding the given entries.
    Entries(HashMap<String, Vec<u8>>),
    /// An archive that exists but fails to open as a valid container.
    Corrupt,
}
impl MockArchive {
    pub fn with_entries(entries: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        Self::Entries(entries.into_iter().map(|(name, data)| (name.into(), data.into())).collect())
    }

    pub fn empty() -> Self {
        Self::Entries(HashMap::new())
    }
}

/// In-memory archive source for testing.
///
/// Archives are stored in a `HashMap` behind a [`RwLock`], keyed by path.
/// Every call to [`open()`](ArchiveSource::open) is counted (successful or
/// not), and every handle that is currently open is tracked, so tests can
/// assert both "opened exactly once" and "closed on every path".
///
/// `open()` yields to the runtime before doing anything, so concurrent
/// callers genuinely interleave even on a current-thread runtime.
///
/// # Examples
///
/// ```
/// use modmeta_archive::source::{MockArchive, MockSource};
/// use modmeta_archive::ArchiveSource;
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = MockSource::with_archives([
///     ("mods/jei.jar", MockArchive::with_entries([("mcmod.info", b"[]".to_vec())])),
/// ]);
/// let mut archive = source.open(Path::new("mods/jei.jar")).await?;
/// assert_eq!(archive.read_entry("mcmod.info").await?, b"[]");
/// assert_eq!(source.open_count(), 1);
/// assert_eq!(source.live_handles(), 1);
/// drop(archive);
/// assert_eq!(source.live_handles(), 0);
/// # Ok(())
/// # }
/// ```
pub struct MockSource {
    name: String,
    archives: RwLock<HashMap<PathBuf, MockArchive>>,
    opens: AtomicUsize,
    live: Arc<AtomicUsize>,
}

impl MockSource {
    /// Create a mock source pre-populated with archives.
    pub fn with_archives(archives: impl IntoIterator<Item = (impl Into<PathBuf>, MockArchive)>) -> Self {
        Self {
            name: "mock".to_string(),
            archives: RwLock::new(archives.into_iter().map(|(path, archive)| (path.into(), archive)).collect()),
            opens: AtomicUsize::new(0),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Change the name of the mock source.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add or replace an archive after construction.
    pub async fn insert(&self, path: impl Into<PathBuf>, archive: MockArchive) {
        self.archives.write().await.insert(path.into(), archive);
    }

    /// Number of times [`open()`](ArchiveSource::open) has been called.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of handles opened by this source that have not been dropped.
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}
impl Default for MockSource {
    fn default() -> Self {
        let archives: [(PathBuf, MockArchive); 0] = [];
        Self::with_archives(archives)
    }
}

#[async_trait]
impl ArchiveSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>> {
        tokio::task::yield_now().await;
        self.opens.fetch_add(1, Ordering::SeqCst);
        let entries = match self.archives.read().await.get(path) {
            Some(MockArchive::Entries(entries)) => entries.clone(),
            Some(MockArchive::Corrupt) | None => exn::bail!(ErrorKind::ArchiveOpen(path.to_path_buf())),
        };
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockReader {
            path: path.to_path_buf(),
            entries,
            live: Arc::clone(&self.live),
        }))
    }
}

struct MockReader {
    path: PathBuf,
    entries: HashMap<String, Vec<u8>>,
    live: Arc<AtomicUsize>,
}

#[async_trait]
impl ArchiveReader for MockReader {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entry(&mut self, entry: &str) -> Result<Vec<u8>> {
        self.entries.get(entry).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::EntryNotFound(entry.to_string())))
    }
}

impl Drop for MockReader {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
