//! Core data model for the rule compiler
//!
//! All wire-facing types use camelCase JSON serialization; the rule input
//! contract (`RuleSpec`) field names are normative.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known default bus rules attach to when none is named
pub const DEFAULT_BUS: &str = "shared";

fn default_bus() -> String {
    DEFAULT_BUS.to_string()
}

/// A declared event-routing rule
///
/// Matches events by `source` and `detail_types` on one bus and fans them
/// out to the listed targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRule {
    /// Rule identity, unique within a registry
    pub name: String,

    /// Producer identifier the rule matches on
    pub source: String,

    /// Event subtypes the rule matches — must be non-empty
    pub detail_types: Vec<String>,

    /// Bus the rule attaches to
    #[serde(default = "default_bus")]
    pub bus: String,

    /// Fan-out destinations, in declaration order
    #[serde(default)]
    pub targets: Vec<TargetSpec>,

    /// In Prod, also forward matched events to the Dev bus
    #[serde(default)]
    pub forward_to_dev: bool,
}

impl EventRule {
    /// Create a rule on the default bus with no targets
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        detail_types: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            detail_types: detail_types.into_iter().map(Into::into).collect(),
            bus: default_bus(),
            targets: Vec::new(),
            forward_to_dev: false,
        }
    }

    /// Attach the rule to a named bus
    pub fn on_bus(mut self, bus: impl Into<String>) -> Self {
        self.bus = bus.into();
        self
    }

    /// Append a target
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.targets.push(target);
        self
    }

    /// Enable production-to-development forwarding
    pub fn forwarded_to_dev(mut self) -> Self {
        self.forward_to_dev = true;
        self
    }
}

/// Rule body as it appears in the external rule-specification mapping
///
/// The mapping key is the rule name; everything else lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    pub source: String,
    pub detail_types: Vec<String>,
    #[serde(default = "default_bus")]
    pub bus: String,
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
    #[serde(default)]
    pub forward_to_dev: bool,
}

impl RuleSpec {
    /// Combine with the mapping key into a full rule
    pub fn named(self, name: impl Into<String>) -> EventRule {
        EventRule {
            name: name.into(),
            source: self.source,
            detail_types: self.detail_types,
            bus: self.bus,
            targets: self.targets,
            forward_to_dev: self.forward_to_dev,
        }
    }
}

/// Closed set of target kinds
///
/// Adding a variant without a matching policy rule is a compile-time error
/// in the synthesizer — exhaustive matching is the correctness guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetKind {
    Queue,
    Topic,
    RemoteBus,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Queue => "queue",
            TargetKind::Topic => "topic",
            TargetKind::RemoteBus => "remoteBus",
        }
    }
}

/// One fan-out destination of a rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
    pub kind: TargetKind,

    /// Existing resource to bind to; absent means "create one"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_ref: Option<String>,

    /// Explicit dead-letter queue; absent means the binder attaches the
    /// rule's shared dead-letter queue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_letter_ref: Option<String>,

    /// Mark the backing resource as protected against deletion
    #[serde(default)]
    pub protected: bool,
}

impl TargetSpec {
    /// Target that creates a new resource of the given kind
    pub fn create(kind: TargetKind) -> Self {
        Self {
            kind,
            resource_ref: None,
            dead_letter_ref: None,
            protected: false,
        }
    }

    /// Target bound to an existing resource
    pub fn existing(kind: TargetKind, resource: impl Into<String>) -> Self {
        Self {
            kind,
            resource_ref: Some(resource.into()),
            dead_letter_ref: None,
            protected: false,
        }
    }

    /// Use an explicit dead-letter queue instead of the rule's shared one
    pub fn with_dead_letter(mut self, queue: impl Into<String>) -> Self {
        self.dead_letter_ref = Some(queue.into());
        self
    }

    /// Mark the backing resource protected
    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }
}

/// Kinds of concrete resources known to the provisioning engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Bus,
    Queue,
    Topic,
    Rule,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Bus => "bus",
            ResourceKind::Queue => "queue",
            ResourceKind::Topic => "topic",
            ResourceKind::Rule => "rule",
        }
    }
}

/// Handle to a concrete resource, existing or planned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
    pub address: String,
}

/// A resource the compiler plans to create
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    pub kind: ResourceKind,
    pub name: String,
    pub address: String,
    pub protected: bool,
    pub attrs: serde_json::Value,
}

impl ResourceSpec {
    /// Handle for referencing this planned resource downstream
    pub fn to_ref(&self) -> ResourceRef {
        ResourceRef {
            kind: self.kind,
            name: self.name.clone(),
            address: self.address.clone(),
        }
    }
}

/// Resolved pairing of a rule to one concrete target
///
/// Owned by the target binder; read-only downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Synthesized identifier, deterministic per (rule, target index)
    pub id: String,

    /// Name of the rule this binding belongs to
    pub rule: String,

    pub kind: TargetKind,

    /// The target resource receiving matched events
    pub resource: ResourceRef,

    /// Dead-letter path — always present for queue/topic bindings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_letter: Option<ResourceRef>,

    /// The external engine must refuse deleting the backing resource
    /// unless explicitly overridden
    #[serde(default)]
    pub protected: bool,
}

/// Action granted by a delivery policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyAction {
    SendMessage,
    Publish,
}

/// Source-match condition pinning a policy to one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCondition {
    /// Identifier of the rule whose deliveries are authorized
    pub source_ref: String,
}

/// Least-privilege permission for one rule→target delivery edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Statement identifier, derived from the binding id
    pub sid: String,

    /// The bus's publishing identity
    pub principal: String,

    pub action: PolicyAction,

    /// Address of the target resource
    pub resource: String,

    /// Always present — the narrowest grant that still delivers
    pub condition: PolicyCondition,
}

impl Policy {
    /// Render the policy as a JSON document for `attach_policy`
    pub fn document(&self) -> serde_json::Value {
        serde_json::json!({
            "sid": self.sid,
            "effect": "allow",
            "principal": self.principal,
            "action": self.action,
            "resource": self.resource,
            "condition": { "sourceRef": self.condition.source_ref },
        })
    }
}

/// Where a dead-letter alarm routes when it fires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlarmRouting {
    /// Created but not routed anywhere (Dev)
    #[default]
    None,
    /// Routed to the non-critical operational channel
    NonCriticalChannel,
}

/// Threshold profile for a dead-letter alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmProfile {
    pub evaluation_periods: u32,
    pub period_seconds: u32,
    pub threshold: u32,
}

impl AlarmProfile {
    /// Fast, noisy detection for moderate-volume queues
    pub const DEFAULT: AlarmProfile = AlarmProfile {
        evaluation_periods: 4,
        period_seconds: 300,
        threshold: 10,
    };

    /// Slower, quieter detection for high-volume, lower-urgency queues
    pub const RELAXED: AlarmProfile = AlarmProfile {
        evaluation_periods: 2,
        period_seconds: 900,
        threshold: 15,
    };
}

impl Default for AlarmProfile {
    fn default() -> Self {
        AlarmProfile::DEFAULT
    }
}

/// Threshold alarm on one dead-letter queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSpec {
    /// Alarm name, derived from the queue name
    pub name: String,

    /// Address of the watched dead-letter queue
    pub queue: String,

    pub evaluation_periods: u32,
    pub period_seconds: u32,
    pub threshold: u32,

    pub routing: AlarmRouting,
}

/// Non-fatal conditions surfaced during compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum CompileWarning {
    /// Rule declares no queue/topic targets — recorded but undelivered
    EmptyRule { rule: String },

    /// Two rules claim the same (bus, source, detailType) combination
    AmbiguousMatch {
        bus: String,
        source: String,
        detail_type: String,
        first: String,
        second: String,
    },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::EmptyRule { rule } => {
                write!(f, "rule '{}' has no delivery targets", rule)
            }
            CompileWarning::AmbiguousMatch {
                bus,
                source,
                detail_type,
                first,
                second,
            } => write!(
                f,
                "rules '{}' and '{}' both match source '{}' detail type '{}' on bus '{}'",
                first, second, source, detail_type, bus
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_builder() {
        let rule = EventRule::new("UserMerge", "user-merge", ["web-repo"])
            .with_target(TargetSpec::existing(TargetKind::Queue, "adm-queue"));

        assert_eq!(rule.name, "UserMerge");
        assert_eq!(rule.bus, DEFAULT_BUS);
        assert_eq!(rule.detail_types, vec!["web-repo"]);
        assert_eq!(rule.targets.len(), 1);
        assert!(!rule.forward_to_dev);
    }

    #[test]
    fn test_rule_wire_contract() {
        // Field names of the external contract are normative
        let json = r#"{
            "source": "user-merge",
            "detailTypes": ["web-repo"],
            "bus": "shared",
            "targets": [{"kind": "queue", "resourceRef": "adm-queue"}],
            "forwardToDev": true
        }"#;

        let spec: RuleSpec = serde_json::from_str(json).unwrap();
        let rule = spec.named("UserMerge");
        assert_eq!(rule.source, "user-merge");
        assert_eq!(rule.targets[0].resource_ref.as_deref(), Some("adm-queue"));
        assert!(rule.forward_to_dev);
    }

    #[test]
    fn test_rule_wire_defaults() {
        let json = r#"{"source": "s", "detailTypes": ["a"]}"#;
        let spec: RuleSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.bus, DEFAULT_BUS);
        assert!(spec.targets.is_empty());
        assert!(!spec.forward_to_dev);
    }

    #[test]
    fn test_target_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&TargetKind::RemoteBus).unwrap(),
            "\"remoteBus\""
        );
        let parsed: TargetKind = serde_json::from_str("\"queue\"").unwrap();
        assert_eq!(parsed, TargetKind::Queue);
    }

    #[test]
    fn test_target_spec_skip_none_fields() {
        let target = TargetSpec::create(TargetKind::Queue);
        let json = serde_json::to_string(&target).unwrap();
        assert!(!json.contains("resourceRef"));
        assert!(!json.contains("deadLetterRef"));
    }

    #[test]
    fn test_target_spec_builders() {
        let target = TargetSpec::existing(TargetKind::Topic, "audit")
            .with_dead_letter("audit-dlq")
            .protected();
        assert_eq!(target.resource_ref.as_deref(), Some("audit"));
        assert_eq!(target.dead_letter_ref.as_deref(), Some("audit-dlq"));
        assert!(target.protected);
    }

    #[test]
    fn test_policy_document() {
        let policy = Policy {
            sid: "allow-UserMerge-t0".to_string(),
            principal: "arn:events:prod:bus/shared-prod".to_string(),
            action: PolicyAction::SendMessage,
            resource: "arn:events:prod:queue/adm-queue".to_string(),
            condition: PolicyCondition {
                source_ref: "arn:events:prod:rule/UserMerge-prod".to_string(),
            },
        };

        let doc = policy.document();
        assert_eq!(doc["action"], "sendMessage");
        assert_eq!(doc["effect"], "allow");
        assert_eq!(doc["condition"]["sourceRef"], "arn:events:prod:rule/UserMerge-prod");
    }

    #[test]
    fn test_alarm_profiles() {
        assert_eq!(AlarmProfile::DEFAULT.evaluation_periods, 4);
        assert_eq!(AlarmProfile::DEFAULT.period_seconds, 300);
        assert_eq!(AlarmProfile::DEFAULT.threshold, 10);
        assert_eq!(AlarmProfile::RELAXED.evaluation_periods, 2);
        assert_eq!(AlarmProfile::RELAXED.period_seconds, 900);
        assert_eq!(AlarmProfile::RELAXED.threshold, 15);
        assert_eq!(AlarmProfile::default(), AlarmProfile::DEFAULT);
    }

    #[test]
    fn test_warning_display() {
        let warning = CompileWarning::EmptyRule {
            rule: "Orphan".to_string(),
        };
        assert_eq!(warning.to_string(), "rule 'Orphan' has no delivery targets");
    }
}
