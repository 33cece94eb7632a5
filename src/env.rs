//! Environment resolution and the explicit compile context
//!
//! The deployment environment is resolved once, from a single flag, and
//! threaded explicitly through every component via `CompileContext`.
//! Nothing in the compiler reads ambient/global environment state.

use crate::engine::ProvisioningEngine;
use crate::types::{ResourceKind, DEFAULT_BUS};
use serde::{Deserialize, Serialize};

/// Deployment environment
///
/// Pure function of the `is_development` flag read at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    /// Resolve the environment from the single external development flag
    pub fn from_development(is_development: bool) -> Self {
        if is_development {
            Environment::Dev
        } else {
            Environment::Prod
        }
    }

    /// Whether this is the development environment
    pub fn is_dev(&self) -> bool {
        matches!(self, Environment::Dev)
    }

    /// The other environment, used for cross-environment addressing
    pub fn peer(&self) -> Environment {
        match self {
            Environment::Dev => Environment::Prod,
            Environment::Prod => Environment::Dev,
        }
    }

    /// Short environment tag used in resource names ("dev" / "prod")
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }

    /// Environment-scoped name: `<base>-<environment>`
    pub fn prefixed(&self, base: &str) -> String {
        format!("{}-{}", base, self.as_str())
    }

    /// Deterministic address for a resource in this environment
    ///
    /// Addresses are synthesized, never generated, so recompiling the same
    /// input always yields the same graph.
    pub fn address_for(&self, kind: ResourceKind, name: &str) -> String {
        format!("arn:events:{}:{}/{}", self.as_str(), kind.as_str(), name)
    }
}

/// Well-known address of another environment's shared bus
///
/// Used only for cross-environment forwarding targets. The remote side's
/// receive permission is provisioned out of band.
pub fn remote_bus_address(environment: Environment) -> String {
    environment.address_for(ResourceKind::Bus, &environment.prefixed(DEFAULT_BUS))
}

/// Explicit compile context passed to every component
///
/// Carries the environment, naming helpers, and the provisioning-engine
/// handle. Multiple contexts can coexist in one process.
pub struct CompileContext<'a> {
    pub environment: Environment,
    pub engine: &'a dyn ProvisioningEngine,
}

impl<'a> CompileContext<'a> {
    /// Create a context for one compile run
    pub fn new(environment: Environment, engine: &'a dyn ProvisioningEngine) -> Self {
        Self {
            environment,
            engine,
        }
    }

    /// Environment-scoped name for a base identifier
    pub fn prefixed(&self, base: &str) -> String {
        self.environment.prefixed(base)
    }

    /// Identifier of a rule as a bus resource, used in policy conditions
    pub fn rule_address(&self, rule_name: &str) -> String {
        self.environment
            .address_for(ResourceKind::Rule, &self.prefixed(rule_name))
    }

    /// Publishing identity of a bus, used as the policy principal
    pub fn bus_principal(&self, bus: &str) -> String {
        self.environment
            .address_for(ResourceKind::Bus, &self.prefixed(bus))
    }
}
