//! Per-name resolution cache with single-flight de-duplication.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use modmeta_descriptor::models::ModMetadata;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{self, Error, Result};

type Outcome = std::result::Result<Arc<ModMetadata>, Arc<Error>>;
type InFlight = Shared<BoxFuture<'static, Outcome>>;

enum Slot {
    /// A resolution is running; every caller for this name awaits the same
    /// future.
    Pending(InFlight),
    Resolved(Arc<ModMetadata>),
}

/// Memoizes resolved metadata by archive logical name.
///
/// A name maps either to its resolved record or to the single in-flight
/// resolution for it. Resolved records are never evicted or replaced. Failed
/// resolutions leave no entry behind, so the next request for that name
/// starts over.
///
/// The lock is only held to inspect or update the map, never while a
/// resolution is running.
#[derive(Default)]
pub struct MetadataCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved record for `name`, if resolution has completed.
    pub async fn get(&self, name: &str) -> Option<Arc<ModMetadata>> {
        match self.slots.lock().await.get(name) {
            Some(Slot::Resolved(metadata)) => Some(Arc::clone(metadata)),
            Some(Slot::Pending(_)) | None => None,
        }
    }

    /// Number of names with a completed resolution.
    pub async fn resolved_count(&self) -> usize {
        self.slots.lock().await.values().filter(|slot| matches!(slot, Slot::Resolved(_))).count()
    }

    /// Returns the record for `name`, running `resolve` only if no record
    /// exists and no resolution for `name` is already in flight.
    ///
    /// All concurrent callers for the same name observe the outcome of the
    /// same single resolution, success or failure. A failure reaches each of
    /// them with its full error tree.
    pub async fn get_or_resolve<F>(&self, name: &str, resolve: F) -> Result<Arc<ModMetadata>>
    where
        F: FnOnce() -> BoxFuture<'static, Result<ModMetadata>>,
    {
        let in_flight = {
            let mut slots = self.slots.lock().await;
            match slots.get(name) {
                Some(Slot::Resolved(metadata)) => {
                    tracing::trace!(name, "Metadata cache hit");
                    return Ok(Arc::clone(metadata));
                },
                Some(Slot::Pending(in_flight)) => {
                    tracing::debug!(name, "Awaiting in-flight resolution");
                    in_flight.clone()
                },
                None => {
                    let in_flight = resolve()
                        .map(|result| {
                            result.map(Arc::new).map_err(|err| {
                                tracing::warn!(error = ?err, "Resolution failed");
                                Arc::new(err)
                            })
                        })
                        .boxed()
                        .shared();
                    slots.insert(name.to_string(), Slot::Pending(in_flight.clone()));
                    in_flight
                },
            }
        };

        let outcome = in_flight.clone().await;

        let mut slots = self.slots.lock().await;
        // Only the first caller to get here settles the slot; everyone else
        // finds it already settled (or replaced by a newer attempt).
        if let Some(Slot::Pending(pending)) = slots.get(name)
            && pending.ptr_eq(&in_flight)
        {
            match &outcome {
                Ok(metadata) => {
                    slots.insert(name.to_string(), Slot::Resolved(Arc::clone(metadata)));
                },
                Err(_) => {
                    slots.remove(name);
                },
            }
        }
        drop(slots);
        outcome.map_err(|failure| error::replay(&failure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use exn::ResultExt;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn metadata(id: &str) -> ModMetadata {
        ModMetadata {
            id: id.to_string(),
            name: id.to_string(),
            version: "1.0.0".to_string(),
            platform_version: None,
        }
    }

    fn counting(calls: &Arc<AtomicUsize>, result: Result<ModMetadata>) -> BoxFuture<'static, Result<ModMetadata>> {
        let calls = Arc::clone(calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            result
        }
        .boxed()
    }

    #[tokio::test]
    async fn test_resolves_once() {
        let cache = MetadataCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let first = cache.get_or_resolve("a.jar", || counting(&calls, Ok(metadata("a")))).await.unwrap();
        let second = cache.get_or_resolve("a.jar", || counting(&calls, Ok(metadata("other")))).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.id, "a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.resolved_count().await, 1);
        assert_eq!(cache.get("a.jar").await, Some(first));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_resolution() {
        let cache = MetadataCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (first, second, third) = tokio::join!(
            cache.get_or_resolve("a.jar", || counting(&calls, Ok(metadata("a")))),
            cache.get_or_resolve("a.jar", || counting(&calls, Ok(metadata("b")))),
            cache.get_or_resolve("a.jar", || counting(&calls, Ok(metadata("c")))),
        );
        let first = first.unwrap();
        assert!(Arc::ptr_eq(&first, &second.unwrap()));
        assert!(Arc::ptr_eq(&first, &third.unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_failure() {
        let cache = MetadataCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = || Err(Error::from(ErrorKind::ArchiveOpen(PathBuf::from("a.jar"))));
        let (first, second) = tokio::join!(
            cache.get_or_resolve("a.jar", || counting(&calls, failure())),
            cache.get_or_resolve("a.jar", || counting(&calls, Ok(metadata("a")))),
        );
        assert_eq!(*first.unwrap_err(), ErrorKind::ArchiveOpen(PathBuf::from("a.jar")));
        assert_eq!(*second.unwrap_err(), ErrorKind::ArchiveOpen(PathBuf::from("a.jar")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_keep_failure_causes() {
        let cache = MetadataCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = || {
            Err::<ModMetadata, _>(std::io::Error::other("invalid Zip archive: Could not find EOCD"))
                .or_raise(|| ErrorKind::ArchiveOpen(PathBuf::from("a.jar")))
        };
        let (first, second) = tokio::join!(
            cache.get_or_resolve("a.jar", || counting(&calls, failure())),
            cache.get_or_resolve("a.jar", || counting(&calls, failure())),
        );
        for err in [first.unwrap_err(), second.unwrap_err()] {
            assert_eq!(*err, ErrorKind::ArchiveOpen(PathBuf::from("a.jar")));
            let causes: Vec<_> = err.frame().children().iter().map(ToString::to_string).collect();
            assert_eq!(causes, ["invalid Zip archive: Could not find EOCD"]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = MetadataCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = Err(Error::from(ErrorKind::ArchiveOpen(PathBuf::from("a.jar"))));
        assert!(cache.get_or_resolve("a.jar", || counting(&calls, failure)).await.is_err());
        assert_eq!(cache.get("a.jar").await, None);
        assert_eq!(cache.resolved_count().await, 0);
        let retried = cache.get_or_resolve("a.jar", || counting(&calls, Ok(metadata("a")))).await.unwrap();
        assert_eq!(retried.id, "a");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_names_are_independent() {
        let cache = MetadataCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (a, b) = tokio::join!(
            cache.get_or_resolve("a.jar", || counting(&calls, Ok(metadata("a")))),
            cache.get_or_resolve("b.jar", || counting(&calls, Ok(metadata("b")))),
        );
        assert_eq!(a.unwrap().id, "a");
        assert_eq!(b.unwrap().id, "b");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.resolved_count().await, 2);
    }
}
