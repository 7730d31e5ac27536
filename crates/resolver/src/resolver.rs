//! The caller-facing resolver: archive source, descriptor policy and cache
//! wired together.

use exn::{OptionExt, ResultExt};
use futures::FutureExt;
use modmeta_archive::SourceHandle;
use modmeta_config::{Config, DEFAULT_MAVEN_GROUP, DEFAULT_RESOLVE_CONCURRENCY};
use modmeta_descriptor::models::{ModMetadata, PlatformVersion};
use modmeta_descriptor::read_metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

use crate::cache::MetadataCache;
use crate::error::{ErrorKind, Result};
use crate::identity::{capitalize, maven_identifier};
use crate::policy::{PolicyHandle, PolicySet};

/// Resolves mod archives to normalized metadata.
///
/// One resolver is shared by every caller for the duration of a batch. Each
/// archive logical name is resolved at most once: the archive is opened,
/// its descriptor located and normalized, and the result cached for the
/// lifetime of the resolver. The cache is keyed by name only; within one
/// batch a logical name is assumed to identify a single archive.
pub struct Resolver {
    source: SourceHandle,
    policy: PolicyHandle,
    pub(crate) cache: MetadataCache,
    maven_group: String,
    pub(crate) concurrency: usize,
}

impl Resolver {
    pub fn new(source: SourceHandle, policy: PolicyHandle) -> Self {
        Self {
            source,
            policy,
            cache: MetadataCache::new(),
            maven_group: DEFAULT_MAVEN_GROUP.to_string(),
            concurrency: DEFAULT_RESOLVE_CONCURRENCY,
        }
    }

    /// Builds a resolver using the first policy in `policies` that handles
    /// the given platform and library versions.
    pub fn for_version(
        source: SourceHandle,
        policies: &PolicySet,
        version: &PlatformVersion,
        library_version: &str,
    ) -> Result<Self> {
        let policy = policies
            .select(version, library_version)
            .ok_or_raise(|| ErrorKind::NoApplicablePolicy(version.to_string()))?;
        tracing::debug!(policy = policy.name(), %version, "Selected descriptor policy");
        Ok(Self::new(source, policy))
    }

    pub fn from_config(source: SourceHandle, policies: &PolicySet, config: &Config) -> Result<Self> {
        let version = config
            .platform()
            .or_raise(|| ErrorKind::NoApplicablePolicy(config.platform_version.clone()))?;
        Ok(Self::for_version(source, policies, &version, config.library_version())?
            .with_maven_group(&config.maven_group)
            .with_concurrency(config.resolve_concurrency))
    }

    pub fn with_maven_group(mut self, group: impl Into<String>) -> Self {
        self.maven_group = group.into();
        self
    }

    /// Maximum number of archives resolved at once by
    /// [`resolve_all()`](Self::resolve_all). Values below 1 are treated as 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn policy(&self) -> &PolicyHandle {
        &self.policy
    }

    /// Whether this resolver's policy handles archives for the given
    /// platform and library versions.
    pub fn is_applicable_to_version(&self, version: &PlatformVersion, library_version: &str) -> bool {
        self.policy.is_applicable(version, library_version)
    }

    /// Metadata previously resolved for `name`, without touching any archive.
    pub async fn cached(&self, name: &str) -> Option<Arc<ModMetadata>> {
        self.cache.get(name).await
    }

    /// Resolves the metadata for the archive with logical name `name`.
    ///
    /// The first call for a name opens the archive at `path`; later calls
    /// (with any `path`) return the same record without reopening anything.
    /// Concurrent first calls share a single open-and-parse.
    ///
    /// # Errors
    ///
    /// - [`ArchiveOpen`](ErrorKind::ArchiveOpen) if the archive cannot be
    ///   opened or is corrupt.
    /// - [`DescriptorRead`](ErrorKind::DescriptorRead) if a special-cased
    ///   archive lacks the entry its identity is read from.
    ///
    /// Failures are not cached.
    #[instrument(skip(self, path), fields(source = self.source.name(), policy = self.policy.name()))]
    pub async fn resolve(&self, name: &str, path: impl AsRef<Path>) -> Result<Arc<ModMetadata>> {
        let path = path.as_ref();
        self.cache
            .get_or_resolve(name, || {
                Self::resolve_uncached(
                    Arc::clone(&self.source),
                    Arc::clone(&self.policy),
                    name.to_string(),
                    path.to_path_buf(),
                )
                .boxed()
            })
            .await
    }

    async fn resolve_uncached(
        source: SourceHandle,
        policy: PolicyHandle,
        name: String,
        path: PathBuf,
    ) -> Result<ModMetadata> {
        tracing::debug!(path = %path.display(), "Opening archive");
        // The handle closes when dropped, on every path out of this function.
        let mut archive = source.open(&path).await.or_raise(|| ErrorKind::ArchiveOpen(path.clone()))?;
        let metadata = read_metadata(policy.as_ref(), archive.as_mut(), &name)
            .await
            .or_raise(|| ErrorKind::DescriptorRead(name.clone()))?;
        tracing::info!(id = %metadata.id, version = %metadata.version, "Resolved mod metadata");
        if metadata.has_unknown_version() {
            tracing::debug!(id = %metadata.id, "Version unknown; module identifiers will use a placeholder");
        }
        Ok(metadata)
    }

    /// Maven identifier (`group:id:version@jar`) for the archive.
    pub async fn module_id(&self, name: &str, path: impl AsRef<Path>) -> Result<String> {
        let metadata = self.resolve(name, path).await?;
        Ok(maven_identifier(&self.maven_group, &metadata))
    }

    /// Display name for the archive, with its first character upper-cased.
    pub async fn module_name(&self, name: &str, path: impl AsRef<Path>) -> Result<String> {
        let metadata = self.resolve(name, path).await?;
        Ok(capitalize(&metadata.name))
    }
}
