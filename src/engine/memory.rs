//! In-memory provisioning engine for development and testing
//!
//! Stores resources, attached policies, and alarms in maps behind a
//! `RwLock`. State is lost on drop — this engine exists so the compiler
//! can be exercised end to end without real infrastructure.

use crate::engine::ProvisioningEngine;
use crate::env::Environment;
use crate::error::{CompileError, Result};
use crate::types::{AlarmSpec, ResourceKind, ResourceRef};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredResource {
    resource: ResourceRef,
    protected: bool,
}

#[derive(Debug, Default)]
struct Inner {
    /// name → resource
    resources: HashMap<String, StoredResource>,

    /// (resource address, policy document), in attach order
    policies: Vec<(String, serde_json::Value)>,

    /// Registered alarms, in registration order
    alarms: Vec<AlarmSpec>,
}

/// In-memory provisioning engine
pub struct MemoryEngine {
    environment: Environment,
    inner: RwLock<Inner>,
}

impl MemoryEngine {
    /// Create an empty engine for the given environment
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Pre-register an existing resource so rules can bind to it by name
    pub fn seed(&self, kind: ResourceKind, name: &str) -> Result<ResourceRef> {
        self.create_resource(kind, name, &serde_json::json!({}))
    }

    /// Number of resources currently held
    pub fn resource_count(&self) -> usize {
        self.read().map(|i| i.resources.len()).unwrap_or(0)
    }

    /// Number of attached policies
    pub fn policy_count(&self) -> usize {
        self.read().map(|i| i.policies.len()).unwrap_or(0)
    }

    /// Number of registered alarms
    pub fn alarm_count(&self) -> usize {
        self.read().map(|i| i.alarms.len()).unwrap_or(0)
    }

    /// Policy documents attached to a resource address
    pub fn policies_for(&self, resource: &str) -> Vec<serde_json::Value> {
        self.read()
            .map(|i| {
                i.policies
                    .iter()
                    .filter(|(r, _)| r == resource)
                    .map(|(_, p)| p.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Registered alarms, in registration order
    pub fn alarms(&self) -> Vec<AlarmSpec> {
        self.read().map(|i| i.alarms.clone()).unwrap_or_default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| CompileError::Engine(format!("Engine lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| CompileError::Engine(format!("Engine lock poisoned: {}", e)))
    }
}

impl ProvisioningEngine for MemoryEngine {
    fn create_resource(
        &self,
        kind: ResourceKind,
        name: &str,
        attrs: &serde_json::Value,
    ) -> Result<ResourceRef> {
        let mut inner = self.write()?;

        if let Some(existing) = inner.resources.get(name) {
            if existing.resource.kind != kind {
                return Err(CompileError::Engine(format!(
                    "Resource '{}' already exists as a {}, not a {}",
                    name,
                    existing.resource.kind.as_str(),
                    kind.as_str()
                )));
            }
            // Idempotent re-create
            return Ok(existing.resource.clone());
        }

        let resource = ResourceRef {
            kind,
            name: name.to_string(),
            address: self.environment.address_for(kind, name),
        };
        let protected = attrs
            .get("protected")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        inner.resources.insert(
            name.to_string(),
            StoredResource {
                resource: resource.clone(),
                protected,
            },
        );
        Ok(resource)
    }

    fn attach_policy(&self, resource: &str, policy: &serde_json::Value) -> Result<()> {
        let mut inner = self.write()?;

        // Idempotent re-attach
        let already = inner
            .policies
            .iter()
            .any(|(r, p)| r == resource && p == policy);
        if !already {
            inner.policies.push((resource.to_string(), policy.clone()));
        }
        Ok(())
    }

    fn register_alarm(&self, spec: &AlarmSpec) -> Result<String> {
        let mut inner = self.write()?;

        if !inner.alarms.iter().any(|a| a.queue == spec.queue) {
            inner.alarms.push(spec.clone());
        }
        Ok(spec.name.clone())
    }

    fn lookup_resource(&self, kind: ResourceKind, name: &str) -> Result<Option<ResourceRef>> {
        let inner = self.read()?;
        Ok(inner
            .resources
            .get(name)
            .filter(|s| s.resource.kind == kind)
            .map(|s| s.resource.clone()))
    }

    fn delete_resource(&self, name: &str, force: bool) -> Result<()> {
        let mut inner = self.write()?;

        match inner.resources.get(name) {
            None => Err(CompileError::Engine(format!(
                "Resource '{}' does not exist",
                name
            ))),
            Some(stored) if stored.protected && !force => {
                tracing::warn!(resource = %name, "Refusing to delete protected resource");
                Err(CompileError::Engine(format!(
                    "Resource '{}' is protected; deletion requires an explicit override",
                    name
                )))
            }
            Some(_) => {
                inner.resources.remove(name);
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup() {
        let engine = MemoryEngine::new(Environment::Prod);
        let created = engine
            .create_resource(ResourceKind::Queue, "adm-queue", &serde_json::json!({}))
            .unwrap();
        assert_eq!(created.address, "arn:events:prod:queue/adm-queue");

        let found = engine
            .lookup_resource(ResourceKind::Queue, "adm-queue")
            .unwrap()
            .unwrap();
        assert_eq!(found, created);
    }

    #[test]
    fn test_lookup_wrong_kind() {
        let engine = MemoryEngine::new(Environment::Prod);
        engine.seed(ResourceKind::Queue, "adm-queue").unwrap();

        let found = engine
            .lookup_resource(ResourceKind::Topic, "adm-queue")
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_create_idempotent() {
        let engine = MemoryEngine::new(Environment::Dev);
        let a = engine
            .create_resource(ResourceKind::Topic, "audit", &serde_json::json!({}))
            .unwrap();
        let b = engine
            .create_resource(ResourceKind::Topic, "audit", &serde_json::json!({}))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(engine.resource_count(), 1);
    }

    #[test]
    fn test_create_kind_conflict() {
        let engine = MemoryEngine::new(Environment::Dev);
        engine.seed(ResourceKind::Queue, "shared-name").unwrap();
        let result =
            engine.create_resource(ResourceKind::Topic, "shared-name", &serde_json::json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn test_attach_policy_idempotent() {
        let engine = MemoryEngine::new(Environment::Prod);
        let doc = serde_json::json!({"sid": "allow-x"});
        engine.attach_policy("arn:events:prod:queue/q", &doc).unwrap();
        engine.attach_policy("arn:events:prod:queue/q", &doc).unwrap();
        assert_eq!(engine.policy_count(), 1);
    }

    #[test]
    fn test_delete_protected_refused() {
        let engine = MemoryEngine::new(Environment::Prod);
        engine
            .create_resource(
                ResourceKind::Topic,
                "live-topic",
                &serde_json::json!({"protected": true}),
            )
            .unwrap();

        assert!(engine.delete_resource("live-topic", false).is_err());
        assert_eq!(engine.resource_count(), 1);

        // Explicit override removes it
        engine.delete_resource("live-topic", true).unwrap();
        assert_eq!(engine.resource_count(), 0);
    }

    #[test]
    fn test_delete_missing() {
        let engine = MemoryEngine::new(Environment::Dev);
        assert!(engine.delete_resource("nope", false).is_err());
    }
}
