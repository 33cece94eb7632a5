//! Error types for buswire

use thiserror::Error;

/// Errors that can occur while compiling or emitting a rule set
#[derive(Debug, Error)]
pub enum CompileError {
    /// Malformed rule input — always fatal, reported with the offending rule
    #[error("Validation failed for rule '{rule}': {reason}")]
    Validation {
        rule: String,
        reason: String,
    },

    /// A target or dead-letter reference names a resource that cannot be found
    #[error("Unresolved reference: no {kind} named '{name}'")]
    UnresolvedReference {
        kind: String,
        name: String,
    },

    /// Internal consistency failure — a downstream step referenced an
    /// identifier never produced by an earlier step. Indicates a compiler
    /// defect, not bad user input.
    #[error("Emission error: {0}")]
    Emission(String),

    /// Provisioning engine failure
    #[error("Provisioning engine error: {0}")]
    Engine(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Schema document rejected by the registry
    #[error("Schema error for event type '{event_type}': {reason}")]
    Schema {
        event_type: String,
        reason: String,
    },
}

/// Result type alias for compile operations
pub type Result<T> = std::result::Result<T, CompileError>;
