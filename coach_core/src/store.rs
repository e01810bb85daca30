//! File-backed plan and session persistence with file locking.
//!
//! Plans live in a single `plans.json` map, written atomically (temp file in
//! the same directory, fsync, rename). Materialized sessions live in
//! `sessions.jsonl`, one JSON record per line: batch inserts append under an
//! exclusive lock, per-plan deletes rewrite the file atomically.

use crate::reconciler::SessionStore;
use crate::types::{MaterializedSession, NewPlan, Plan, PlanStatus};
use crate::{Error, Result};
use chrono::Utc;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// File-backed store for plans and their materialized sessions
pub struct PlanStore {
    data_dir: PathBuf,
}

impl PlanStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn plans_path(&self) -> PathBuf {
        self.data_dir.join("plans.json")
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.data_dir.join("sessions.jsonl")
    }

    // ------------------------------------------------------------------
    // Plan operations
    // ------------------------------------------------------------------

    /// Create a plan from the supplied fields
    ///
    /// The store assigns the id and timestamps; new plans start as drafts.
    pub fn create_plan(&self, fields: NewPlan) -> Result<Plan> {
        let now = Utc::now();
        let plan = Plan {
            id: Uuid::new_v4(),
            client_id: fields.client_id,
            trainer_id: fields.trainer_id,
            name: fields.name,
            description: fields.description,
            start_date: fields.start_date,
            end_date: fields.end_date,
            schedule_type: fields.schedule_type,
            schedule_data: fields.schedule_data,
            status: PlanStatus::Draft,
            created_at: now,
            updated_at: now,
        };

        let mut plans = self.load_plans()?;
        plans.insert(plan.id, plan.clone());
        self.save_plans(&plans)?;

        tracing::info!("Created plan {} for client {}", plan.id, plan.client_id);
        Ok(plan)
    }

    /// Replace a plan's editable fields, bumping `updated_at`
    ///
    /// Status and creation timestamp are preserved.
    pub fn update_plan(&self, id: Uuid, fields: NewPlan) -> Result<Plan> {
        let mut plans = self.load_plans()?;
        let plan = plans.get_mut(&id).ok_or(Error::PlanNotFound(id))?;

        plan.client_id = fields.client_id;
        plan.trainer_id = fields.trainer_id;
        plan.name = fields.name;
        plan.description = fields.description;
        plan.start_date = fields.start_date;
        plan.end_date = fields.end_date;
        plan.schedule_type = fields.schedule_type;
        plan.schedule_data = fields.schedule_data;
        plan.updated_at = Utc::now();

        let updated = plan.clone();
        self.save_plans(&plans)?;

        tracing::info!("Updated plan {}", id);
        Ok(updated)
    }

    pub fn get_plan(&self, id: Uuid) -> Result<Option<Plan>> {
        Ok(self.load_plans()?.remove(&id))
    }

    /// All plans, newest first
    pub fn list_plans(&self) -> Result<Vec<Plan>> {
        let mut plans: Vec<Plan> = self.load_plans()?.into_values().collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    pub fn set_status(&self, id: Uuid, status: PlanStatus) -> Result<Plan> {
        let mut plans = self.load_plans()?;
        let plan = plans.get_mut(&id).ok_or(Error::PlanNotFound(id))?;
        plan.status = status;
        plan.updated_at = Utc::now();
        let updated = plan.clone();
        self.save_plans(&plans)?;

        tracing::info!("Plan {} status set to {}", id, status);
        Ok(updated)
    }

    /// Delete a plan and, first, every session it owns
    ///
    /// Sessions are removed before the plan record so a crash in between
    /// leaves a plan without sessions, never orphaned sessions.
    pub fn delete_plan(&self, id: Uuid) -> Result<()> {
        let mut plans = self.load_plans()?;
        if !plans.contains_key(&id) {
            return Err(Error::PlanNotFound(id));
        }

        let removed = self.delete_plan_sessions(id)?;
        plans.remove(&id);
        self.save_plans(&plans)?;

        tracing::info!("Deleted plan {} and {} sessions", id, removed);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Session operations
    // ------------------------------------------------------------------

    /// All stored sessions for a plan, in stored (insertion) order
    pub fn sessions_for_plan(&self, plan_id: Uuid) -> Result<Vec<MaterializedSession>> {
        Ok(self
            .read_all_sessions()?
            .into_iter()
            .filter(|s| s.plan_id == plan_id)
            .collect())
    }

    fn read_all_sessions(&self) -> Result<Vec<MaterializedSession>> {
        let path = self.sessions_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        let reader = BufReader::new(&file);
        let mut sessions = Vec::new();
        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<MaterializedSession>(&line) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
                    // Continue reading, don't fail completely
                }
            }
        }

        file.unlock()?;
        Ok(sessions)
    }

    // ------------------------------------------------------------------
    // File plumbing
    // ------------------------------------------------------------------

    fn load_plans(&self) -> Result<HashMap<Uuid, Plan>> {
        let path = self.plans_path();
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = BufReader::new(&file);
        reader.read_to_string(&mut contents)?;
        file.unlock()?;

        match serde_json::from_str::<HashMap<Uuid, Plan>>(&contents) {
            Ok(plans) => Ok(plans),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse plans file {:?}: {}. Treating as empty.",
                    path,
                    e
                );
                Ok(HashMap::new())
            }
        }
    }

    fn save_plans(&self, plans: &HashMap<Uuid, Plan>) -> Result<()> {
        let path = self.plans_path();
        write_atomic(&path, serde_json::to_string(plans)?.as_bytes())
    }
}

impl SessionStore for PlanStore {
    fn delete_plan_sessions(&self, plan_id: Uuid) -> Result<usize> {
        let path = self.sessions_path();
        if !path.exists() {
            return Ok(0);
        }

        let all = self.read_all_sessions()?;
        let kept: Vec<&MaterializedSession> =
            all.iter().filter(|s| s.plan_id != plan_id).collect();
        let removed = all.len() - kept.len();

        let mut contents = Vec::new();
        for session in &kept {
            serde_json::to_writer(&mut contents, session)?;
            contents.push(b'\n');
        }
        write_atomic(&path, &contents)?;

        tracing::debug!("Removed {} sessions for plan {}", removed, plan_id);
        Ok(removed)
    }

    fn insert_sessions(&self, sessions: &[MaterializedSession]) -> Result<()> {
        let path = self.sessions_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        for session in sessions {
            let line = serde_json::to_string(session)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        drop(writer);

        file.sync_all()?;
        file.unlock()?;

        tracing::debug!("Appended {} sessions", sessions.len());
        Ok(())
    }
}

/// Atomically replace a file's contents
///
/// Writes to a locked temp file in the same directory, fsyncs, then renames
/// over the target.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "store path missing parent")
    })?)?;

    temp.as_file().lock_exclusive()?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(contents)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
