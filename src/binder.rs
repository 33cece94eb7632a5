//! Target binder — expand abstract target lists into concrete bindings
//!
//! For each target the binder resolves or plans the backing resource,
//! attaches a dead-letter path, and in Prod appends the cross-environment
//! forwarding binding. Planned resources are returned as graph fragments;
//! nothing is created here.

use crate::engine::ProvisioningEngine;
use crate::env::{remote_bus_address, CompileContext, Environment};
use crate::error::{CompileError, Result};
use crate::types::{
    Binding, CompileWarning, EventRule, ResourceKind, ResourceRef, ResourceSpec, TargetKind,
    TargetSpec, DEFAULT_BUS,
};
use std::collections::HashMap;

/// Fragments produced by binding one rule
#[derive(Debug, Default)]
pub struct BindOutcome {
    /// Bindings in order: primary targets first, forwarding last
    pub bindings: Vec<Binding>,

    /// Resources the compiler plans to create
    pub created: Vec<ResourceSpec>,

    /// Non-fatal conditions found while binding
    pub warnings: Vec<CompileWarning>,
}

/// Binds rules to concrete resources for one compile run
///
/// Holds the per-rule dead-letter reuse cache; scoped to one compile and
/// discarded after.
pub struct TargetBinder<'a> {
    ctx: &'a CompileContext<'a>,

    /// rule name → shared dead-letter queue planned for that rule
    dlq_cache: HashMap<String, ResourceRef>,
}

impl<'a> TargetBinder<'a> {
    /// Create a binder for one compile run
    pub fn new(ctx: &'a CompileContext<'a>) -> Self {
        Self {
            ctx,
            dlq_cache: HashMap::new(),
        }
    }

    /// Bind all of a rule's targets, returning the ordered fragment set
    pub fn bind(&mut self, rule: &EventRule) -> Result<BindOutcome> {
        let mut outcome = BindOutcome::default();

        for (index, target) in rule.targets.iter().enumerate() {
            let binding = match target.kind {
                TargetKind::Queue => {
                    self.bind_local(rule, index, target, ResourceKind::Queue, &mut outcome)?
                }
                TargetKind::Topic => {
                    self.bind_local(rule, index, target, ResourceKind::Topic, &mut outcome)?
                }
                TargetKind::RemoteBus => self.bind_remote(rule, index, target),
            };
            outcome.bindings.push(binding);
        }

        // Environment fan-out: Prod duplicates delivery to the Dev bus.
        // One-directional, and its downstream failure never blocks the
        // primary bindings.
        if self.ctx.environment == Environment::Prod && rule.forward_to_dev {
            outcome.bindings.push(Binding {
                id: format!("{}-fwd-dev", rule.name),
                rule: rule.name.clone(),
                kind: TargetKind::RemoteBus,
                resource: ResourceRef {
                    kind: ResourceKind::Bus,
                    name: Environment::Dev.prefixed(DEFAULT_BUS),
                    address: remote_bus_address(Environment::Dev),
                },
                dead_letter: None,
                protected: false,
            });
        }

        let has_delivery = rule
            .targets
            .iter()
            .any(|t| matches!(t.kind, TargetKind::Queue | TargetKind::Topic));
        if !has_delivery {
            // Legal: some event types exist only to backfill a future consumer
            tracing::warn!(rule = %rule.name, "Rule has no delivery targets");
            outcome.warnings.push(CompileWarning::EmptyRule {
                rule: rule.name.clone(),
            });
        }

        Ok(outcome)
    }

    fn bind_local(
        &mut self,
        rule: &EventRule,
        index: usize,
        target: &TargetSpec,
        kind: ResourceKind,
        outcome: &mut BindOutcome,
    ) -> Result<Binding> {
        let resource = match &target.resource_ref {
            Some(name) => self.lookup(kind, name)?,
            None => {
                // Deterministic name from rule + target index; no two
                // targets in one rule can collide
                let name = self.ctx.prefixed(&format!("{}-t{}", rule.name, index));
                self.plan(kind, &name, target.protected, outcome)
            }
        };

        let dead_letter = match &target.dead_letter_ref {
            Some(name) => self.lookup(ResourceKind::Queue, name)?,
            None => self.rule_dlq(rule, outcome),
        };

        // Live topics are externally depended upon; losing one is worse
        // than blocking a teardown
        let protected = target.protected
            || (kind == ResourceKind::Topic && target.resource_ref.is_some());

        Ok(Binding {
            id: format!("{}-t{}", rule.name, index),
            rule: rule.name.clone(),
            kind: target.kind,
            resource,
            dead_letter: Some(dead_letter),
            protected,
        })
    }

    fn bind_remote(&self, rule: &EventRule, index: usize, target: &TargetSpec) -> Binding {
        let peer = self.ctx.environment.peer();
        let (name, address) = match &target.resource_ref {
            // Full addresses pass through verbatim; permission on the
            // remote side is provisioned out of band
            Some(r) if r.contains(':') => (
                r.rsplit('/').next().unwrap_or(r.as_str()).to_string(),
                r.clone(),
            ),
            Some(r) => (r.clone(), peer.address_for(ResourceKind::Bus, r)),
            None => (peer.prefixed(DEFAULT_BUS), remote_bus_address(peer)),
        };

        Binding {
            id: format!("{}-t{}", rule.name, index),
            rule: rule.name.clone(),
            kind: TargetKind::RemoteBus,
            resource: ResourceRef {
                kind: ResourceKind::Bus,
                name,
                address,
            },
            dead_letter: None,
            protected: false,
        }
    }

    /// Shared per-rule dead-letter queue, planned once and reused
    fn rule_dlq(&mut self, rule: &EventRule, outcome: &mut BindOutcome) -> ResourceRef {
        if let Some(existing) = self.dlq_cache.get(&rule.name) {
            return existing.clone();
        }

        let name = self.ctx.prefixed(&format!("{}-dlq", rule.name));
        let resource = self.plan(ResourceKind::Queue, &name, false, outcome);
        self.dlq_cache.insert(rule.name.clone(), resource.clone());
        resource
    }

    fn plan(
        &self,
        kind: ResourceKind,
        name: &str,
        protected: bool,
        outcome: &mut BindOutcome,
    ) -> ResourceRef {
        let spec = ResourceSpec {
            kind,
            name: name.to_string(),
            address: self.ctx.environment.address_for(kind, name),
            protected,
            attrs: serde_json::json!({
                "environment": self.ctx.environment.as_str(),
                "protected": protected,
            }),
        };
        let resource = spec.to_ref();
        outcome.created.push(spec);
        resource
    }

    fn lookup(&self, kind: ResourceKind, name: &str) -> Result<ResourceRef> {
        self.ctx
            .engine
            .lookup_resource(kind, name)?
            .ok_or_else(|| CompileError::UnresolvedReference {
                kind: kind.as_str().to_string(),
                name: name.to_string(),
            })
    }
}
