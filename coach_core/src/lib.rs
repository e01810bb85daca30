#![forbid(unsafe_code)]

//! Core domain model and business logic for the trainer plan scheduler.
//!
//! This crate provides:
//! - Domain types (plans, schedule patterns, materialized sessions)
//! - Schedule validation and session materialization
//! - Plan/session reconciliation with replace-on-edit semantics
//! - Persistence (plan store, drafts, pending-sync log)
//! - CSV export and the template registry

pub mod types;
pub mod error;
pub mod calendar;
pub mod schedule;
pub mod materializer;
pub mod reconciler;
pub mod store;
pub mod drafts;
pub mod export;
pub mod templates;
pub mod config;
pub mod logging;
pub mod planfile;

// Re-export commonly used types
pub use error::{Error, PersistencePhase, Result};
pub use types::*;
pub use config::Config;
pub use materializer::materialize;
pub use reconciler::{ReconcileOutcome, Reconciler, SessionStore};
pub use store::PlanStore;
pub use drafts::{DraftCache, SyncAction, SyncLog};
pub use export::write_sessions_csv;
pub use templates::{build_registry, default_registry, TemplateRegistry, TemplateSummary};
pub use planfile::{load_plan_file, parse_plan_file};
