//! Descriptor policy dispatch by platform version.

use modmeta_descriptor::models::PlatformVersion;
use modmeta_descriptor::{DescriptorPolicy, LegacyForgePolicy};
use std::sync::Arc;

pub type PolicyHandle = Arc<dyn DescriptorPolicy + Send + Sync>;

/// An ordered set of descriptor policies.
///
/// [`select()`](Self::select) returns the first policy whose
/// [`is_applicable`](DescriptorPolicy::is_applicable) predicate accepts the
/// platform and library versions, so more specific policies should be
/// registered first.
#[derive(Clone)]
pub struct PolicySet {
    policies: Vec<PolicyHandle>,
}
impl PolicySet {
    /// A set with no policies registered.
    pub fn empty() -> Self {
        Self { policies: Vec::new() }
    }

    /// Register a policy after all existing ones.
    pub fn with(mut self, policy: PolicyHandle) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn select(&self, version: &PlatformVersion, library_version: &str) -> Option<PolicyHandle> {
        self.policies.iter().find(|policy| policy.is_applicable(version, library_version)).cloned()
    }
}
impl Default for PolicySet {
    fn default() -> Self {
        Self::empty().with(Arc::new(LegacyForgePolicy))
    }
}
