//! Resource graph emitter — the composition root
//!
//! Folds fragments from the registry, binder, policy synthesizer, and
//! alarm generator into one `ResourceGraph`, verifies internal
//! consistency, and applies the graph to the provisioning engine in
//! dependency order. Compilation is all-or-nothing: the engine is never
//! touched for writes until the whole graph has validated.

use crate::alarm::DlqAlarms;
use crate::binder::TargetBinder;
use crate::engine::ProvisioningEngine;
use crate::env::CompileContext;
use crate::error::{CompileError, Result};
use crate::policy;
use crate::registry::RuleRegistry;
use crate::types::{AlarmProfile, AlarmSpec, Binding, CompileWarning, Policy, ResourceSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The finished, validated node set for one compile run
///
/// Ordering is the emission dependency order: resources before policies
/// before alarms, since policies and alarms reference resource addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGraph {
    pub resources: Vec<ResourceSpec>,
    pub bindings: Vec<Binding>,
    pub policies: Vec<Policy>,
    pub alarms: Vec<AlarmSpec>,
    pub warnings: Vec<CompileWarning>,
}

/// Counts of applied nodes, returned by `emit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitSummary {
    pub resources: usize,
    pub policies: usize,
    pub alarms: usize,
}

/// Compile a rule set into a resource graph with the default alarm profile
pub fn compile(ctx: &CompileContext<'_>, registry: &RuleRegistry) -> Result<ResourceGraph> {
    compile_with_profile(ctx, registry, AlarmProfile::DEFAULT)
}

/// Compile with an explicit dead-letter alarm profile
///
/// Profile selection is a caller decision; high-volume, lower-urgency rule
/// sets typically pass `AlarmProfile::RELAXED`.
pub fn compile_with_profile(
    ctx: &CompileContext<'_>,
    registry: &RuleRegistry,
    dlq_profile: AlarmProfile,
) -> Result<ResourceGraph> {
    let mut graph = ResourceGraph {
        resources: Vec::new(),
        bindings: Vec::new(),
        policies: Vec::new(),
        alarms: Vec::new(),
        warnings: registry.ambiguities(),
    };
    for warning in &graph.warnings {
        tracing::warn!(%warning, "Ambiguous rule match");
    }

    let mut binder = TargetBinder::new(ctx);
    let mut alarms = DlqAlarms::new(ctx.environment);

    for rule in registry.all() {
        let outcome = binder.bind(rule)?;

        for binding in &outcome.bindings {
            if let Some(policy) = policy::synthesize(ctx, rule, binding) {
                graph.policies.push(policy);
            }
            if let Some(dead_letter) = &binding.dead_letter {
                alarms.ensure_alarm(dead_letter, dlq_profile);
            }
        }

        graph.resources.extend(outcome.created);
        graph.bindings.extend(outcome.bindings);
        graph.warnings.extend(outcome.warnings);
    }

    graph.alarms = alarms.into_specs();
    verify(&graph)?;
    Ok(graph)
}

/// Internal consistency check before anything reaches the engine
///
/// Every address a policy or alarm references must have been produced by an
/// earlier step. A failure here is a compiler defect, not a user error.
fn verify(graph: &ResourceGraph) -> Result<()> {
    let mut produced: HashSet<&str> = graph
        .resources
        .iter()
        .map(|r| r.address.as_str())
        .collect();
    for binding in &graph.bindings {
        produced.insert(binding.resource.address.as_str());
        if let Some(dead_letter) = &binding.dead_letter {
            produced.insert(dead_letter.address.as_str());
        }
    }

    for policy in &graph.policies {
        if !produced.contains(policy.resource.as_str()) {
            return Err(CompileError::Emission(format!(
                "policy '{}' references unknown resource '{}'",
                policy.sid, policy.resource
            )));
        }
    }
    for alarm in &graph.alarms {
        if !produced.contains(alarm.queue.as_str()) {
            return Err(CompileError::Emission(format!(
                "alarm '{}' references unknown queue '{}'",
                alarm.name, alarm.queue
            )));
        }
    }

    Ok(())
}

/// Apply a compiled graph to the provisioning engine in dependency order
pub fn emit(ctx: &CompileContext<'_>, graph: &ResourceGraph) -> Result<EmitSummary> {
    for spec in &graph.resources {
        let created = ctx
            .engine
            .create_resource(spec.kind, &spec.name, &spec.attrs)?;
        if created.address != spec.address {
            return Err(CompileError::Emission(format!(
                "engine returned address '{}' for planned resource '{}'",
                created.address, spec.address
            )));
        }
    }

    for policy in &graph.policies {
        ctx.engine.attach_policy(&policy.resource, &policy.document())?;
    }

    for alarm in &graph.alarms {
        ctx.engine.register_alarm(alarm)?;
    }

    tracing::info!(
        engine = ctx.engine.name(),
        resources = graph.resources.len(),
        policies = graph.policies.len(),
        alarms = graph.alarms.len(),
        warnings = graph.warnings.len(),
        "Graph emitted"
    );

    Ok(EmitSummary {
        resources: graph.resources.len(),
        policies: graph.policies.len(),
        alarms: graph.alarms.len(),
    })
}
