//! Session materialization: expanding a declarative schedule into
//! concrete session records.
//!
//! Pure and deterministic: no I/O, no clock reads. Identical inputs yield
//! identical output sequences, which is what makes regeneration on edit safe.

use crate::calendar::{days_inclusive, week_of_month, weekday_of};
use crate::types::{MaterializedSession, ScheduleData, SessionStatus};
use crate::{Error, Result};
use chrono::NaiveDate;
use uuid::Uuid;

/// Expand a schedule over a date range into an ordered list of sessions
///
/// Output order is chronological for weekly/monthly schedules (a consequence
/// of the ascending date iteration) and input order for custom/session
/// schedules. Accepts `start == end` as a single-day inclusive range; an
/// inverted range fails fast rather than silently iterating nothing.
///
/// Assumes a pre-validated shape (see [`crate::schedule`]); unknown weekday
/// or week keys simply produce no sessions.
pub fn materialize(
    plan_id: Uuid,
    schedule: &ScheduleData,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<MaterializedSession>> {
    if start > end {
        return Err(Error::InvalidDateRange { start, end });
    }

    let mut sessions = Vec::new();

    match schedule {
        ScheduleData::Weekly { days } => {
            for date in days_inclusive(start, end) {
                let weekday = weekday_of(date);
                if let Some(Some(template_id)) = days.get(&weekday) {
                    sessions.push(MaterializedSession {
                        plan_id,
                        template_id: Some(template_id.clone()),
                        scheduled_date: Some(date),
                        day_of_week: Some(weekday),
                        week_number: None,
                        status: SessionStatus::Scheduled,
                        notes: None,
                    });
                }
            }
        }

        ScheduleData::Monthly { weeks } => {
            for date in days_inclusive(start, end) {
                // Days 29-31 fall in week 5, which the pattern never
                // defines; they produce no session.
                let week = week_of_month(date);
                if let Some(week_days) = weeks.get(&week) {
                    let weekday = weekday_of(date);
                    if let Some(Some(template_id)) = week_days.get(&weekday) {
                        sessions.push(MaterializedSession {
                            plan_id,
                            template_id: Some(template_id.clone()),
                            scheduled_date: Some(date),
                            day_of_week: Some(weekday),
                            week_number: Some(week),
                            status: SessionStatus::Scheduled,
                            notes: None,
                        });
                    }
                }
            }
        }

        ScheduleData::Custom { entries } => {
            // Entry dates are authoritative: no filtering against the plan
            // range, no de-duplication by date. Null-template entries are
            // explicit rest markers and emit nothing.
            for entry in entries {
                if let Some(template_id) = &entry.template_id {
                    sessions.push(MaterializedSession {
                        plan_id,
                        template_id: Some(template_id.clone()),
                        scheduled_date: Some(entry.date),
                        day_of_week: None,
                        week_number: None,
                        status: SessionStatus::Scheduled,
                        notes: Some(entry.label.clone()),
                    });
                }
            }
        }

        ScheduleData::Session { entries } => {
            for entry in entries {
                if let Some(template_id) = &entry.template_id {
                    sessions.push(MaterializedSession {
                        plan_id,
                        template_id: Some(template_id.clone()),
                        scheduled_date: None,
                        day_of_week: None,
                        week_number: None,
                        status: SessionStatus::Scheduled,
                        notes: Some(entry.session_key.clone()),
                    });
                }
            }
        }
    }

    tracing::debug!(
        "Materialized {} sessions for plan {} ({})",
        sessions.len(),
        plan_id,
        schedule.schedule_type()
    );

    Ok(sessions)
}
