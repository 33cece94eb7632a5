//! Rule registry — validated, ordered set of declared event rules

use crate::error::{CompileError, Result};
use crate::types::{CompileWarning, EventRule, RuleSpec};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Holds the declared rules for one compile run
///
/// Registration order is preserved; it determines emitted-resource ordering
/// only, never matching semantics (pattern matching on the bus is
/// order-independent).
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<EventRule>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the external rule-specification mapping
    ///
    /// The mapping is JSON of rule name → rule body. Rules register in
    /// name order so that identical input always yields identical output.
    pub fn from_json(json: &str) -> Result<Self> {
        let specs: BTreeMap<String, RuleSpec> = serde_json::from_str(json)?;

        let mut registry = Self::new();
        for (name, spec) in specs {
            registry.register(spec.named(name))?;
        }
        Ok(registry)
    }

    /// Register a rule, validating its shape
    pub fn register(&mut self, rule: EventRule) -> Result<()> {
        if rule.name.is_empty() {
            return Err(CompileError::Validation {
                rule: rule.name,
                reason: "rule name must be non-empty".to_string(),
            });
        }
        if rule.detail_types.is_empty() {
            return Err(CompileError::Validation {
                rule: rule.name,
                reason: "detailTypes must be non-empty".to_string(),
            });
        }
        if self.rules.iter().any(|r| r.name == rule.name) {
            return Err(CompileError::Validation {
                rule: rule.name,
                reason: "duplicate rule name".to_string(),
            });
        }

        self.rules.push(rule);
        Ok(())
    }

    /// All rules, in registration order
    pub fn all(&self) -> &[EventRule] {
        &self.rules
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find pairs of rules that compete for the same events
    ///
    /// Two rules claiming the same (bus, source, detailType) combination is
    /// legal — multiple rules may match one event — but it is surfaced as a
    /// warning so the producer can distinguish them deliberately.
    pub fn ambiguities(&self) -> Vec<CompileWarning> {
        let mut claimed: HashMap<(String, String, String), &str> = HashMap::new();
        let mut warnings = Vec::new();

        for rule in &self.rules {
            for detail_type in &rule.detail_types {
                let key = (
                    rule.bus.clone(),
                    rule.source.clone(),
                    detail_type.clone(),
                );
                match claimed.get(&key) {
                    Some(first) => warnings.push(CompileWarning::AmbiguousMatch {
                        bus: rule.bus.clone(),
                        source: rule.source.clone(),
                        detail_type: detail_type.clone(),
                        first: first.to_string(),
                        second: rule.name.clone(),
                    }),
                    None => {
                        claimed.insert(key, rule.name.as_str());
                    }
                }
            }
        }

        warnings
    }
}
