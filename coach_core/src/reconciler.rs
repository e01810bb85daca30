//! Plan/session reconciliation: replace-on-edit semantics.
//!
//! The reconciler sequences materialization with persistence. On edit the
//! previously materialized batch is deleted before the new one is inserted;
//! that ordering is the whole contract and is never reversed.

use crate::materializer::materialize;
use crate::types::{MaterializedSession, Plan};
use crate::{Error, PersistencePhase, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Persistence collaborator seam for materialized sessions
pub trait SessionStore {
    /// Delete every materialized session belonging to a plan; returns the
    /// number removed
    fn delete_plan_sessions(&self, plan_id: Uuid) -> Result<usize>;

    /// Insert a full batch of materialized sessions
    fn insert_sessions(&self, sessions: &[MaterializedSession]) -> Result<()>;
}

/// Result of a successful reconcile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Number of sessions materialized and inserted
    pub created: usize,
}

/// Sequences delete-materialize-insert for a plan's sessions
///
/// Reconcile calls for the same plan are serialized through a per-plan gate,
/// so two concurrent saves cannot interleave their delete and insert phases.
/// There is no retry and no rollback: a failed insert leaves the completed
/// delete in place, which the caller surfaces for a user-driven retry.
#[derive(Default)]
pub struct Reconciler {
    gates: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    fn gate_for(&self, plan_id: Uuid) -> Arc<Mutex<()>> {
        let mut gates = self
            .gates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        gates.entry(plan_id).or_default().clone()
    }

    /// Materialize a plan's schedule and persist the batch
    ///
    /// When `is_edit` is true the plan's prior sessions are deleted first;
    /// the delete must complete before anything is inserted. An empty
    /// materialization performs no insert and reports zero created.
    pub fn reconcile(
        &self,
        store: &dyn SessionStore,
        plan: &Plan,
        is_edit: bool,
    ) -> Result<ReconcileOutcome> {
        let gate = self.gate_for(plan.id);
        let _held = gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if is_edit {
            let removed = store
                .delete_plan_sessions(plan.id)
                .map_err(|e| Error::persistence(PersistencePhase::Delete, e))?;
            tracing::debug!("Deleted {} prior sessions for plan {}", removed, plan.id);
        }

        let sessions = materialize(
            plan.id,
            &plan.schedule_data,
            plan.start_date,
            plan.end_date,
        )?;

        if !sessions.is_empty() {
            store
                .insert_sessions(&sessions)
                .map_err(|e| Error::persistence(PersistencePhase::Insert, e))?;
        }

        tracing::info!(
            "Reconciled plan {}: {} sessions ({})",
            plan.id,
            sessions.len(),
            if is_edit { "edit" } else { "create" }
        );

        Ok(ReconcileOutcome {
            created: sessions.len(),
        })
    }
}
