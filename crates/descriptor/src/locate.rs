//! Descriptor location.
//!
//! Which entry holds a mod's identity (and what it looks like) depends on the
//! platform version the archive was built for, so location is a strategy
//! ([`DescriptorPolicy`]) selected by platform version rather than a single
//! hardcoded routine.

use async_trait::async_trait;
use exn::ResultExt;
use modmeta_archive::ArchiveReader;
use tracing::instrument;

use crate::consts::{LEGACY_DESCRIPTOR_ENTRY, OPTIFINE_CHANGELOG_ENTRY, OPTIFINE_NAME_PATTERN};
use crate::error::{ErrorKind, Result};
use crate::models::{PlatformVersion, SpecialCase};

/// Raw descriptor bytes as found in the archive, before decoding.
///
/// Whether a standard descriptor is a single record, a list or a versioned
/// list is only known once it has been decoded; see
/// [`decode()`](crate::decode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDescriptor {
    /// Contents of the policy's standard descriptor entry.
    Standard(Vec<u8>),
    /// Contents of the auxiliary entry for a special-cased archive.
    Special(SpecialCase, Vec<u8>),
    /// No descriptor entry could be read.
    Absent,
}

/// Shape-detection strategy for one family of platform versions.
#[async_trait]
pub trait DescriptorPolicy: Send + Sync {
    /// Name of the policy, used for logging only.
    fn name(&self) -> &str;

    /// Returns `true` if this policy handles archives built for the given
    /// platform version and mod-loader library version.
    fn is_applicable(&self, version: &PlatformVersion, library_version: &str) -> bool;

    /// Find the descriptor inside an opened archive.
    ///
    /// A missing standard descriptor is not an error (it yields
    /// [`RawDescriptor::Absent`]); a missing special-case entry is, because
    /// there is nothing sensible to fall back to.
    async fn locate(&self, archive: &mut dyn ArchiveReader, name: &str) -> Result<RawDescriptor>;
}

/// Descriptor policy for Forge mods on platform versions 1.7 through 1.12.
///
/// Mods carry an `mcmod.info` JSON descriptor. OptiFine, which can be loaded
/// as a Forge mod but has no descriptor, is recognized by name and described
/// by its `changelog.txt` instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyForgePolicy;
impl LegacyForgePolicy {
    pub const SUPPORTED_MINORS: [u32; 6] = [7, 8, 9, 10, 11, 12];

    /// Static form of [`DescriptorPolicy::is_applicable`], for dispatchers
    /// that decide before constructing a policy.
    pub fn applies_to(version: &PlatformVersion, _library_version: &str) -> bool {
        version.is_release_minor_in(&Self::SUPPORTED_MINORS)
    }

    fn is_special_case(name: &str) -> bool {
        name.to_lowercase().contains(OPTIFINE_NAME_PATTERN)
    }
}

#[async_trait]
impl DescriptorPolicy for LegacyForgePolicy {
    fn name(&self) -> &str {
        "forge-legacy"
    }

    fn is_applicable(&self, version: &PlatformVersion, library_version: &str) -> bool {
        Self::applies_to(version, library_version)
    }

    #[instrument(level = "debug", skip(self, archive), fields(path = %archive.path().display()))]
    async fn locate(&self, archive: &mut dyn ArchiveReader, name: &str) -> Result<RawDescriptor> {
        if Self::is_special_case(name) {
            let changelog = archive
                .read_entry(OPTIFINE_CHANGELOG_ENTRY)
                .await
                .or_raise(|| ErrorKind::DescriptorRead(OPTIFINE_CHANGELOG_ENTRY))?;
            return Ok(RawDescriptor::Special(SpecialCase::OptiFineChangelog, changelog));
        }
        match archive.read_entry(LEGACY_DESCRIPTOR_ENTRY).await {
            Ok(bytes) => Ok(RawDescriptor::Standard(bytes)),
            Err(err) => {
                tracing::debug!(error = ?err, entry = LEGACY_DESCRIPTOR_ENTRY, "Standard descriptor unavailable");
                Ok(RawDescriptor::Absent)
            },
        }
    }
}
