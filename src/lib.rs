//! # buswire
//!
//! Compile declarative event-routing rules into a concrete messaging
//! resource graph.
//!
//! ## Overview
//!
//! `buswire` takes a set of event rules (source, detail-type filter,
//! targets) and deterministically derives everything each rule depends on:
//! dead-letter queues, least-privilege delivery policies, cross-environment
//! forwarding, and dead-letter threshold alarms. The output is a
//! configuration graph handed to an external provisioning engine — the
//! compiler performs no message delivery itself.
//!
//! ## Quick Start
//!
//! ```rust
//! use buswire::engine::MemoryEngine;
//! use buswire::{
//!     CompileContext, Environment, EventRule, ResourceKind, RuleRegistry, TargetKind,
//!     TargetSpec,
//! };
//!
//! # fn example() -> buswire::Result<()> {
//! let engine = MemoryEngine::new(Environment::Prod);
//! engine.seed(ResourceKind::Queue, "adm-queue")?;
//! let ctx = CompileContext::new(Environment::Prod, &engine);
//!
//! let mut registry = RuleRegistry::new();
//! registry.register(
//!     EventRule::new("UserMerge", "user-merge", ["web-repo"])
//!         .with_target(TargetSpec::existing(TargetKind::Queue, "adm-queue")),
//! )?;
//!
//! let graph = buswire::compile(&ctx, &registry)?;
//! buswire::emit(&ctx, &graph)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Environment** / **CompileContext** — deployment context resolved once
//!   and threaded explicitly through every component
//! - **RuleRegistry** — validated, ordered rule set
//! - **TargetBinder** — expands targets into concrete bindings with
//!   dead-letter paths and Prod→Dev forwarding
//! - **Policy synthesizer** — one least-privilege policy per local binding
//! - **DlqAlarms** — deduplicated threshold alarms per dead-letter queue
//! - **Emitter** — folds the fragments into a `ResourceGraph` and applies
//!   it through the `ProvisioningEngine` trait in dependency order
//! - **Schema side-channel** — per-event-type payload schemas published
//!   independently of compilation

pub mod alarm;
pub mod binder;
pub mod emitter;
pub mod engine;
pub mod env;
pub mod error;
pub mod policy;
pub mod registry;
pub mod schema;
pub mod types;

// Re-export core types
pub use alarm::DlqAlarms;
pub use binder::{BindOutcome, TargetBinder};
pub use emitter::{compile, compile_with_profile, emit, EmitSummary, ResourceGraph};
pub use engine::{MemoryEngine, ProvisioningEngine};
pub use env::{remote_bus_address, CompileContext, Environment};
pub use error::{CompileError, Result};
pub use registry::RuleRegistry;
pub use schema::{MemorySchemaRegistry, SchemaDoc, SchemaPublisher};
pub use types::{
    AlarmProfile, AlarmRouting, AlarmSpec, Binding, CompileWarning, EventRule, Policy,
    PolicyAction, PolicyCondition, ResourceKind, ResourceRef, ResourceSpec, RuleSpec, TargetKind,
    TargetSpec, DEFAULT_BUS,
};
