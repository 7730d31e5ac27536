//! Batch resolution.
//!
//! Resolves a whole mods directory through one [`Resolver`], reporting
//! progress as a stream of [`BatchEvent`]s.

use async_stream::stream;
use futures::{Stream, StreamExt};
use modmeta_descriptor::models::ModMetadata;
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;

use crate::error::Error;
use crate::resolver::Resolver;

#[derive(Debug)]
pub enum BatchEvent {
    /// Emitted first, with the number of archives in the batch.
    Started { total: usize },
    Resolved { name: String, metadata: Arc<ModMetadata> },
    /// The archive could not be resolved. The batch carries on.
    Failed { name: String, error: Error },
    /// Emitted last, once every archive has been reported.
    Complete { resolved: usize, failed: usize },
}

impl Resolver {
    /// Resolves every `(name, path)` pair, up to the configured concurrency
    /// at once.
    ///
    /// Events for individual archives arrive in completion order. A failed
    /// archive is reported as [`BatchEvent::Failed`] and the batch carries
    /// on; the stream always ends with [`BatchEvent::Complete`].
    pub fn resolve_all<'a>(
        &'a self,
        archives: impl IntoIterator<Item = (String, PathBuf)>,
    ) -> impl Stream<Item = BatchEvent> + 'a {
        let archives: Vec<_> = archives.into_iter().collect();
        stream! {
            yield BatchEvent::Started { total: archives.len() };
            let (mut resolved, mut failed) = (0, 0);
            let mut results = pin!(
                futures::stream::iter(archives)
                    .map(|(name, path)| async move {
                        let result = self.resolve(&name, &path).await;
                        (name, result)
                    })
                    .buffer_unordered(self.concurrency)
            );
            while let Some((name, result)) = results.next().await {
                match result {
                    Ok(metadata) => {
                        resolved += 1;
                        yield BatchEvent::Resolved { name, metadata };
                    },
                    Err(error) => {
                        failed += 1;
                        tracing::warn!(name, error = %*error, "Skipping archive");
                        yield BatchEvent::Failed { name, error };
                    },
                }
            }
            let cached = self.cache.resolved_count().await;
            tracing::info!(resolved, failed, cached, "Batch resolution complete");
            yield BatchEvent::Complete { resolved, failed };
        }
    }
}
