//! Cached mod metadata resolution.
//!
//! A [`Resolver`] owns a [`MetadataCache`] for the lifetime of a batch and
//! resolves each archive logical name at most once, no matter how many
//! callers ask for it concurrently.
//!
//! ```rust,no_run
//! use modmeta_archive::ZipSource;
//! use modmeta_config::Config;
//! use modmeta_resolver::{PolicySet, Resolver};
//! use std::sync::Arc;
//!
//! # async fn run() -> modmeta_resolver::error::Result<()> {
//! let resolver = Resolver::from_config(Arc::new(ZipSource::default()), &PolicySet::default(), &Config::default())?;
//! let metadata = resolver.resolve("jei.jar", "mods/jei.jar").await?;
//! println!("{} {}", metadata.id, metadata.version);
//! # Ok(())
//! # }
//! ```

mod batch;
mod cache;
pub mod error;
mod identity;
mod policy;
mod resolver;

pub use crate::batch::BatchEvent;
pub use crate::cache::MetadataCache;
pub use crate::identity::{MAVEN_EXTENSION, capitalize, maven_identifier};
pub use crate::policy::{PolicyHandle, PolicySet};
pub use crate::resolver::Resolver;
