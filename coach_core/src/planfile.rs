//! Plan definition files.
//!
//! The CLI takes plans as TOML files and converts them into domain types.
//! The converter always yields complete pattern shapes (all seven weekdays,
//! all four monthly weeks, absent = rest), so downstream validation failures
//! point at genuinely bad input rather than missing boilerplate.
//!
//! ```toml
//! name = "Summer Shred Program"
//! client = "sarah"
//! start_date = "2024-01-15"
//! end_date = "2024-03-15"      # optional; defaults from config
//! schedule = "weekly"
//!
//! [weekly]                     # lowercase day keys; absent day = rest
//! monday = "tpl_full_body"
//! wednesday = "tpl_upper_body"
//! ```

use crate::config::Config;
use crate::types::{
    CustomEntry, NewPlan, ScheduleData, ScheduleType, SessionEntry, Weekday, WeeklyPattern,
};
use crate::{Error, Result};
use chrono::{Days, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct PlanFile {
    name: String,
    description: Option<String>,
    client: String,
    start_date: String,
    end_date: Option<String>,
    schedule: String,
    weekly: Option<HashMap<String, String>>,
    monthly: Option<MonthlyTables>,
    custom: Option<Vec<CustomTable>>,
    session: Option<Vec<SessionTable>>,
}

#[derive(Debug, Default, Deserialize)]
struct MonthlyTables {
    week1: Option<HashMap<String, String>>,
    week2: Option<HashMap<String, String>>,
    week3: Option<HashMap<String, String>>,
    week4: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct CustomTable {
    date: String,
    template: Option<String>,
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionTable {
    key: Option<String>,
    template: Option<String>,
}

/// Load a plan definition file and convert it into creation fields
///
/// The trainer id and the default plan duration come from config.
pub fn load_plan_file(path: &Path, config: &Config) -> Result<NewPlan> {
    let contents = std::fs::read_to_string(path)?;
    parse_plan_file(&contents, config)
}

/// Parse plan file contents into creation fields
pub fn parse_plan_file(contents: &str, config: &Config) -> Result<NewPlan> {
    let file: PlanFile = toml::from_str(contents)?;

    let schedule_type = parse_schedule_type(&file.schedule)?;
    let start_date = parse_date(&file.start_date, "start_date")?;
    let end_date = match &file.end_date {
        Some(raw) => parse_date(raw, "end_date")?,
        None => default_end_date(start_date, config)?,
    };

    let schedule_data = build_schedule_data(schedule_type, &file)?;

    Ok(NewPlan {
        client_id: file.client,
        trainer_id: config.trainer.id.clone(),
        name: file.name,
        description: file.description.filter(|d| !d.trim().is_empty()),
        start_date,
        end_date,
        schedule_type,
        schedule_data,
    })
}

fn parse_schedule_type(raw: &str) -> Result<ScheduleType> {
    match raw.to_lowercase().as_str() {
        "weekly" => Ok(ScheduleType::Weekly),
        "monthly" => Ok(ScheduleType::Monthly),
        "custom" => Ok(ScheduleType::Custom),
        "session" => Ok(ScheduleType::Session),
        other => Err(Error::PlanFile(format!(
            "unknown schedule type '{}' (expected weekly, monthly, custom, or session)",
            other
        ))),
    }
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| Error::PlanFile(format!("invalid {} '{}': {}", field, raw, e)))
}

fn default_end_date(start: NaiveDate, config: &Config) -> Result<NaiveDate> {
    let days = u64::from(config.plans.default_duration_weeks) * 7;
    start
        .checked_add_days(Days::new(days))
        .ok_or_else(|| Error::PlanFile("default end date overflows the calendar".into()))
}

/// Expand a lowercase-keyed day table into a full seven-key weekly pattern
fn weekly_from_table(table: &HashMap<String, String>, context: &str) -> Result<WeeklyPattern> {
    let mut pattern: WeeklyPattern = Weekday::ALL.iter().map(|d| (*d, None)).collect();
    for (key, template) in table {
        let day = Weekday::from_lowercase(key).ok_or_else(|| {
            Error::PlanFile(format!("{}: unknown day '{}'", context, key))
        })?;
        pattern.insert(day, Some(template.clone()));
    }
    Ok(pattern)
}

fn build_schedule_data(schedule_type: ScheduleType, file: &PlanFile) -> Result<ScheduleData> {
    // The declared schedule must match the pattern table provided; a stray
    // table for a different type is a shape mismatch, not ignored input.
    let tables_present = [
        (ScheduleType::Weekly, file.weekly.is_some()),
        (ScheduleType::Monthly, file.monthly.is_some()),
        (ScheduleType::Custom, file.custom.is_some()),
        (ScheduleType::Session, file.session.is_some()),
    ];
    for (table_type, present) in tables_present {
        if present && table_type != schedule_type {
            return Err(Error::ShapeMismatch(format!(
                "schedule is declared '{}' but the file carries a '{}' table",
                schedule_type, table_type
            )));
        }
    }

    match schedule_type {
        ScheduleType::Weekly => {
            let table = file.weekly.as_ref().ok_or_else(|| {
                Error::ShapeMismatch("weekly schedule declared but no [weekly] table".into())
            })?;
            Ok(ScheduleData::Weekly {
                days: weekly_from_table(table, "[weekly]")?,
            })
        }

        ScheduleType::Monthly => {
            let tables = file.monthly.as_ref().ok_or_else(|| {
                Error::ShapeMismatch("monthly schedule declared but no [monthly] tables".into())
            })?;
            let weeks_input = [
                (1u8, &tables.week1),
                (2, &tables.week2),
                (3, &tables.week3),
                (4, &tables.week4),
            ];
            let mut weeks = HashMap::new();
            for (index, table) in weeks_input {
                let pattern = match table {
                    Some(t) => weekly_from_table(t, &format!("[monthly.week{}]", index))?,
                    None => Weekday::ALL.iter().map(|d| (*d, None)).collect(),
                };
                weeks.insert(index, pattern);
            }
            Ok(ScheduleData::Monthly { weeks })
        }

        ScheduleType::Custom => {
            let tables = file.custom.as_ref().ok_or_else(|| {
                Error::ShapeMismatch("custom schedule declared but no [[custom]] entries".into())
            })?;
            let entries = tables
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    Ok(CustomEntry {
                        id: Uuid::new_v4().to_string(),
                        date: parse_date(&t.date, "custom entry date")?,
                        template_id: t.template.clone(),
                        label: t
                            .label
                            .clone()
                            .unwrap_or_else(|| format!("Workout {}", i + 1)),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ScheduleData::Custom { entries })
        }

        ScheduleType::Session => {
            let tables = file.session.as_ref().ok_or_else(|| {
                Error::ShapeMismatch("session schedule declared but no [[session]] entries".into())
            })?;
            let entries = tables
                .iter()
                .enumerate()
                .map(|(i, t)| SessionEntry {
                    session_key: t
                        .key
                        .clone()
                        .unwrap_or_else(|| format!("session_{}", i + 1)),
                    template_id: t.template.clone(),
                })
                .collect();
            Ok(ScheduleData::Session { entries })
        }
    }
}
