//! CSV export of a plan's materialized schedule.

use crate::types::{MaterializedSession, Plan};
use crate::Result;
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    plan_id: String,
    plan_name: String,
    scheduled_date: Option<String>,
    day_of_week: Option<String>,
    week_number: Option<u8>,
    template_id: Option<String>,
    status: String,
    notes: Option<String>,
}

impl CsvRow {
    fn new(plan: &Plan, session: &MaterializedSession) -> Self {
        CsvRow {
            plan_id: session.plan_id.to_string(),
            plan_name: plan.name.clone(),
            scheduled_date: session.scheduled_date.map(|d| d.to_string()),
            day_of_week: session.day_of_week.map(|d| d.to_string()),
            week_number: session.week_number,
            template_id: session.template_id.clone(),
            status: session.status.to_string(),
            notes: session.notes.clone(),
        }
    }
}

/// Write a plan's sessions as a CSV handout, returning the row count
///
/// The file is replaced, not appended, and synced to disk before returning.
pub fn write_sessions_csv(
    plan: &Plan,
    sessions: &[MaterializedSession],
    path: &Path,
) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for session in sessions {
        writer.serialize(CsvRow::new(plan, session))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} sessions to {:?}", sessions.len(), path);
    Ok(sessions.len())
}
