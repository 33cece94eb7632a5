//! Dead-letter alarm generator — threshold alarms on every dead-letter queue
//!
//! Deduplicates by queue address: a queue shared across rules gets exactly
//! one alarm. In Dev the alarm is still created (for later promotion) but
//! its routing is forced to `None` so nothing pages.

use crate::env::Environment;
use crate::types::{AlarmProfile, AlarmRouting, AlarmSpec, ResourceRef};
use std::collections::HashMap;

/// Collects alarm specs for one compile run
#[derive(Debug)]
pub struct DlqAlarms {
    environment: Environment,
    specs: Vec<AlarmSpec>,

    /// queue address → index into `specs`
    seen: HashMap<String, usize>,
}

impl DlqAlarms {
    /// Create an empty alarm set for the given environment
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            specs: Vec::new(),
            seen: HashMap::new(),
        }
    }

    /// Ensure an alarm exists for a dead-letter queue
    ///
    /// Profile selection is the caller's decision, never inferred. Calling
    /// twice with the same queue is a no-op returning the existing spec —
    /// the first profile wins.
    pub fn ensure_alarm(&mut self, queue: &ResourceRef, profile: AlarmProfile) -> &AlarmSpec {
        let index = match self.seen.get(&queue.address).copied() {
            Some(index) => index,
            None => {
                let routing = if self.environment.is_dev() {
                    AlarmRouting::None
                } else {
                    AlarmRouting::NonCriticalChannel
                };
                self.specs.push(AlarmSpec {
                    name: format!("{}-alarm", queue.name),
                    queue: queue.address.clone(),
                    evaluation_periods: profile.evaluation_periods,
                    period_seconds: profile.period_seconds,
                    threshold: profile.threshold,
                    routing,
                });
                let index = self.specs.len() - 1;
                self.seen.insert(queue.address.clone(), index);
                index
            }
        };
        &self.specs[index]
    }

    /// Number of distinct alarms collected
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether no alarms were collected
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Consume the set, yielding alarms in first-seen order
    pub fn into_specs(self) -> Vec<AlarmSpec> {
        self.specs
    }
}
