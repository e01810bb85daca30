//! Offline plan drafts and the best-effort pending-sync log.
//!
//! Both are small JSON files read whole and replaced atomically. The sync log
//! is a local record of not-yet-pushed changes with no merge or retry logic:
//! recording an entry replaces any prior entry for the same (kind, id).

use crate::types::NewPlan;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Locally cached plan drafts, keyed by a user-chosen name
pub struct DraftCache {
    path: PathBuf,
}

impl DraftCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store or replace a draft under the given name
    pub fn save_draft(&self, name: &str, draft: &NewPlan) -> Result<()> {
        let mut drafts: HashMap<String, NewPlan> = load_json_or_default(&self.path);
        drafts.insert(name.to_string(), draft.clone());
        save_json(&self.path, &drafts)?;
        tracing::debug!("Saved draft '{}'", name);
        Ok(())
    }

    pub fn load_draft(&self, name: &str) -> Result<Option<NewPlan>> {
        let mut drafts: HashMap<String, NewPlan> = load_json_or_default(&self.path);
        Ok(drafts.remove(name))
    }

    /// Draft names, sorted
    pub fn list_drafts(&self) -> Result<Vec<String>> {
        let drafts: HashMap<String, NewPlan> = load_json_or_default(&self.path);
        let mut names: Vec<String> = drafts.into_keys().collect();
        names.sort();
        Ok(names)
    }

    /// Remove a draft; returns whether it existed
    pub fn remove_draft(&self, name: &str) -> Result<bool> {
        let mut drafts: HashMap<String, NewPlan> = load_json_or_default(&self.path);
        let existed = drafts.remove(name).is_some();
        if existed {
            save_json(&self.path, &drafts)?;
        }
        Ok(existed)
    }
}

/// Action recorded against a pending-sync entry
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Create,
    Update,
    Delete,
}

/// One entry in the pending-sync log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SyncEntry {
    pub kind: String,
    pub id: String,
    pub action: SyncAction,
    pub queued_at: DateTime<Utc>,
}

/// Best-effort local log of changes awaiting a remote push
pub struct SyncLog {
    path: PathBuf,
}

impl SyncLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Record a change, replacing any prior entry for the same (kind, id)
    pub fn record(&self, kind: &str, id: &str, action: SyncAction) -> Result<()> {
        let mut entries: Vec<SyncEntry> = load_json_or_default(&self.path);
        entries.retain(|e| !(e.kind == kind && e.id == id));
        entries.push(SyncEntry {
            kind: kind.to_string(),
            id: id.to_string(),
            action,
            queued_at: Utc::now(),
        });
        save_json(&self.path, &entries)?;
        tracing::debug!("Recorded pending sync: {} {} ({:?})", kind, id, action);
        Ok(())
    }

    pub fn pending(&self) -> Result<Vec<SyncEntry>> {
        Ok(load_json_or_default(&self.path))
    }

    pub fn remove(&self, kind: &str, id: &str) -> Result<()> {
        let mut entries: Vec<SyncEntry> = load_json_or_default(&self.path);
        entries.retain(|e| !(e.kind == kind && e.id == id));
        save_json(&self.path, &entries)
    }

    pub fn clear(&self) -> Result<()> {
        save_json(&self.path, &Vec::<SyncEntry>::new())
    }
}

/// Load a JSON file, degrading to the default on absence or corruption
fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open {:?}: {}. Using defaults.", path, e);
            return T::default();
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock {:?}: {}. Using defaults.", path, e);
        return T::default();
    }

    let mut contents = String::new();
    let mut reader = BufReader::new(&file);
    let read_result = reader.read_to_string(&mut contents);
    let _ = file.unlock();

    if let Err(e) = read_result {
        tracing::warn!("Failed to read {:?}: {}. Using defaults.", path, e);
        return T::default();
    }

    match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}. Using defaults.", path, e);
            T::default()
        }
    }
}

/// Atomically write a value as JSON
fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "cache path missing parent")
    })?)?;

    temp.as_file().lock_exclusive()?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(value)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScheduleData, ScheduleType, SessionEntry};
    use chrono::NaiveDate;

    fn test_draft(name: &str) -> NewPlan {
        NewPlan {
            client_id: "sarah".into(),
            trainer_id: "coach".into(),
            name: name.into(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            schedule_type: ScheduleType::Session,
            schedule_data: ScheduleData::Session {
                entries: vec![SessionEntry {
                    session_key: "s1".into(),
                    template_id: Some("tpl_full_body".into()),
                }],
            },
        }
    }

    #[test]
    fn test_draft_save_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = DraftCache::new(temp_dir.path().join("drafts.json"));

        cache.save_draft("spring", &test_draft("Spring Block")).unwrap();
        let loaded = cache.load_draft("spring").unwrap().unwrap();
        assert_eq!(loaded.name, "Spring Block");

        assert!(cache.load_draft("missing").unwrap().is_none());
    }

    #[test]
    fn test_draft_upsert_and_remove() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = DraftCache::new(temp_dir.path().join("drafts.json"));

        cache.save_draft("spring", &test_draft("v1")).unwrap();
        cache.save_draft("spring", &test_draft("v2")).unwrap();
        assert_eq!(cache.list_drafts().unwrap(), vec!["spring".to_string()]);
        assert_eq!(cache.load_draft("spring").unwrap().unwrap().name, "v2");

        assert!(cache.remove_draft("spring").unwrap());
        assert!(!cache.remove_draft("spring").unwrap());
        assert!(cache.list_drafts().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_cache_degrades_to_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("drafts.json");
        std::fs::write(&path, "not json at all").unwrap();

        let cache = DraftCache::new(&path);
        assert!(cache.list_drafts().unwrap().is_empty());
    }

    #[test]
    fn test_sync_log_replaces_same_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = SyncLog::new(temp_dir.path().join("pending_sync.json"));

        log.record("plan", "p1", SyncAction::Create).unwrap();
        log.record("plan", "p2", SyncAction::Create).unwrap();
        log.record("plan", "p1", SyncAction::Update).unwrap();

        let entries = log.pending().unwrap();
        assert_eq!(entries.len(), 2);
        // The replaced entry moves to the back
        assert_eq!(entries[0].id, "p2");
        assert_eq!(entries[1].id, "p1");
        assert_eq!(entries[1].action, SyncAction::Update);
    }

    #[test]
    fn test_sync_log_remove_and_clear() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = SyncLog::new(temp_dir.path().join("pending_sync.json"));

        log.record("plan", "p1", SyncAction::Create).unwrap();
        log.record("plan", "p2", SyncAction::Delete).unwrap();

        log.remove("plan", "p1").unwrap();
        assert_eq!(log.pending().unwrap().len(), 1);

        log.clear().unwrap();
        assert!(log.pending().unwrap().is_empty());
    }
}
