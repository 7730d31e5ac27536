//! Mod descriptor location, decoding and normalization.
//!
//! Given an opened mod archive, a [`DescriptorPolicy`] finds the embedded
//! descriptor (or decides there is none) and [`normalize()`] turns whatever
//! was found into a single [`ModMetadata`](models::ModMetadata) record. Only
//! archive-level failures on required entries are errors; malformed or
//! missing standard descriptors fall back to a record synthesized from the
//! archive's logical name.

mod consts;
pub mod error;
mod locate;
pub mod models;
mod normalize;

use modmeta_archive::ArchiveReader;
use tracing::instrument;

pub use crate::consts::{OPTIFINE_ID, UNKNOWN_VERSION};
use crate::error::Result;
pub use crate::locate::{DescriptorPolicy, LegacyForgePolicy, RawDescriptor};
use crate::models::ModMetadata;
pub use crate::normalize::{Decoded, decode, normalize, sanitize_version};

/// Easy, top-level entrypoint: locate the descriptor inside an opened archive
/// and normalize it.
///
/// Fails only when the policy cannot read an entry it requires (see
/// [`DescriptorPolicy::locate`]).
#[instrument(skip(policy, archive), fields(policy = policy.name(), path = %archive.path().display()))]
pub async fn read_metadata(
    policy: &dyn DescriptorPolicy,
    archive: &mut dyn ArchiveReader,
    name: &str,
) -> Result<ModMetadata> {
    let descriptor = policy.locate(archive, name).await?;
    Ok(normalize(descriptor, name))
}
