//! Policy synthesizer — least-privilege grants per delivery edge
//!
//! One policy per local binding, always pinned to the triggering rule via
//! the source-ref condition. Pure: same inputs always yield the same
//! document, so recompiling is a no-op when nothing changed.

use crate::env::CompileContext;
use crate::types::{Binding, EventRule, Policy, PolicyAction, PolicyCondition, TargetKind};

/// Synthesize the access policy for one rule→target edge
///
/// Returns `None` for remote-bus bindings: their permission lives in the
/// remote account and is provisioned out of band. The match is exhaustive
/// on purpose — a new target kind must state its policy rule here before
/// the crate compiles.
pub fn synthesize(ctx: &CompileContext<'_>, rule: &EventRule, binding: &Binding) -> Option<Policy> {
    let action = match binding.kind {
        TargetKind::Queue => PolicyAction::SendMessage,
        TargetKind::Topic => PolicyAction::Publish,
        TargetKind::RemoteBus => return None,
    };

    Some(Policy {
        sid: format!("allow-{}", binding.id),
        principal: ctx.bus_principal(&rule.bus),
        action,
        resource: binding.resource.address.clone(),
        condition: PolicyCondition {
            source_ref: ctx.rule_address(&rule.name),
        },
    })
}
