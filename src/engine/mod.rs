//! Provisioning engine trait — the seam to the external execution layer
//!
//! The compiler produces a resource graph; an engine turns it into live
//! infrastructure. The compiler only ever talks to an engine through this
//! trait: read-only lookups during binding, ordered applies during emission.

use crate::error::Result;
use crate::types::{AlarmSpec, ResourceKind, ResourceRef};

pub mod memory;

pub use memory::MemoryEngine;

/// Interface the compiler consumes; implemented outside the core
///
/// Applies must be idempotent: re-applying an identical graph is a no-op.
pub trait ProvisioningEngine: Send + Sync {
    /// Create a resource, returning its concrete handle
    ///
    /// Creating a resource that already exists with the same kind returns
    /// the existing handle.
    fn create_resource(
        &self,
        kind: ResourceKind,
        name: &str,
        attrs: &serde_json::Value,
    ) -> Result<ResourceRef>;

    /// Attach a policy document to a resource, identified by address
    fn attach_policy(&self, resource: &str, policy: &serde_json::Value) -> Result<()>;

    /// Register a threshold alarm, returning its reference
    fn register_alarm(&self, spec: &AlarmSpec) -> Result<String>;

    /// Look up an existing resource by kind and name
    fn lookup_resource(&self, kind: ResourceKind, name: &str) -> Result<Option<ResourceRef>>;

    /// Delete a resource by name
    ///
    /// Refuses to delete protected resources unless `force` is set.
    fn delete_resource(&self, name: &str, force: bool) -> Result<()>;

    /// Engine name (e.g., "memory")
    fn name(&self) -> &str;
}
