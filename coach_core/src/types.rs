//! Core domain types for the plan scheduling system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Schedule patterns (weekly, monthly, custom, session-based)
//! - Plans and their lifecycle status
//! - Materialized sessions derived from a plan's schedule

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Schedule Types
// ============================================================================

/// Tag identifying which schedule pattern shape a plan carries
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Weekly,
    Monthly,
    Custom,
    Session,
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScheduleType::Weekly => "weekly",
            ScheduleType::Monthly => "monthly",
            ScheduleType::Custom => "custom",
            ScheduleType::Session => "session",
        };
        f.write_str(s)
    }
}

/// Calendar weekday, Monday-first ordering
///
/// Serialized with capitalized names ("Monday") to match the pattern
/// objects stored by the mobile app.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven weekdays in Monday-first order
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Parse a lowercase day name ("monday") as used in plan files
    pub fn from_lowercase(s: &str) -> Option<Weekday> {
        Weekday::ALL
            .iter()
            .copied()
            .find(|d| d.as_str().to_lowercase() == s)
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weekly pattern: every weekday maps to a template or a rest day (None)
///
/// Invariant (validated, not assumed): exactly the seven weekdays as keys.
pub type WeeklyPattern = HashMap<Weekday, Option<String>>;

/// Monthly pattern: week index (1-4) to an independent weekly pattern
///
/// Invariant: key set is exactly {1, 2, 3, 4}.
pub type MonthlyPattern = HashMap<u8, WeeklyPattern>;

/// One explicitly dated entry in a custom schedule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomEntry {
    pub id: String,
    pub date: NaiveDate,
    pub template_id: Option<String>,
    pub label: String,
}

/// One date-less entry in a session-count-based schedule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionEntry {
    pub session_key: String,
    pub template_id: Option<String>,
}

/// The four valid schedule pattern shapes, tagged to match [`ScheduleType`]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleData {
    Weekly { days: WeeklyPattern },
    Monthly { weeks: MonthlyPattern },
    Custom { entries: Vec<CustomEntry> },
    Session { entries: Vec<SessionEntry> },
}

impl ScheduleData {
    /// The tag this pattern shape corresponds to
    pub fn schedule_type(&self) -> ScheduleType {
        match self {
            ScheduleData::Weekly { .. } => ScheduleType::Weekly,
            ScheduleData::Monthly { .. } => ScheduleType::Monthly,
            ScheduleData::Custom { .. } => ScheduleType::Custom,
            ScheduleData::Session { .. } => ScheduleType::Session,
        }
    }
}

// ============================================================================
// Plan Types
// ============================================================================

/// Lifecycle status of a plan
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "draft",
            PlanStatus::Active => "active",
            PlanStatus::Completed => "completed",
            PlanStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<PlanStatus> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PlanStatus::Draft),
            "active" => Some(PlanStatus::Active),
            "completed" => Some(PlanStatus::Completed),
            "cancelled" => Some(PlanStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trainer-authored, client-assigned schedule of templates over a date range
///
/// `schedule_type` and `schedule_data` are stored side by side, mirroring the
/// two-column schema of the backing tables; agreement between them is a
/// validated data-integrity invariant, never silently tolerated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub client_id: String,
    pub trainer_id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub schedule_type: ScheduleType,
    pub schedule_data: ScheduleData,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating or editing a plan
///
/// Everything the store fills in (id, status, timestamps) is omitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewPlan {
    pub client_id: String,
    pub trainer_id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub schedule_type: ScheduleType,
    pub schedule_data: ScheduleData,
}

// ============================================================================
// Materialized Session Types
// ============================================================================

/// Status of a single scheduled session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Skipped,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Skipped => "skipped",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete session derived from a plan's declarative schedule
///
/// Created only by the materializer, never directly by callers. Records carry
/// no id of their own: they are owned wholesale by their plan and replaced as
/// a full batch on every edit. `scheduled_date` is None for session-type
/// plans, which order by position instead of by calendar.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MaterializedSession {
    pub plan_id: Uuid,
    pub template_id: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub day_of_week: Option<Weekday>,
    pub week_number: Option<u8>,
    pub status: SessionStatus,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_serde_capitalized() {
        let json = serde_json::to_string(&Weekday::Wednesday).unwrap();
        assert_eq!(json, "\"Wednesday\"");
        let back: Weekday = serde_json::from_str("\"Sunday\"").unwrap();
        assert_eq!(back, Weekday::Sunday);
    }

    #[test]
    fn test_weekday_from_chrono() {
        assert_eq!(Weekday::from(chrono::Weekday::Mon), Weekday::Monday);
        assert_eq!(Weekday::from(chrono::Weekday::Sun), Weekday::Sunday);
    }

    #[test]
    fn test_weekday_from_lowercase() {
        assert_eq!(Weekday::from_lowercase("friday"), Some(Weekday::Friday));
        assert_eq!(Weekday::from_lowercase("someday"), None);
    }

    #[test]
    fn test_schedule_data_tag_roundtrip() {
        let data = ScheduleData::Custom {
            entries: vec![CustomEntry {
                id: "c1".into(),
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                template_id: Some("tpl_full_body".into()),
                label: "Workout 1".into(),
            }],
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"type\":\"custom\""));
        let back: ScheduleData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.schedule_type(), ScheduleType::Custom);
        assert_eq!(back, data);
    }

    #[test]
    fn test_schedule_type_matches_data() {
        let weekly = ScheduleData::Weekly {
            days: Weekday::ALL.iter().map(|d| (*d, None)).collect(),
        };
        assert_eq!(weekly.schedule_type(), ScheduleType::Weekly);

        let session = ScheduleData::Session { entries: vec![] };
        assert_eq!(session.schedule_type(), ScheduleType::Session);
    }
}
