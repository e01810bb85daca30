//! Schedule and plan validation.
//!
//! All checks run before materialization: the materializer assumes a
//! pre-validated shape and never re-checks it.

use crate::types::{NewPlan, ScheduleData, ScheduleType, Weekday, WeeklyPattern};
use crate::{Error, Result};
use chrono::NaiveDate;

/// Validate that a weekly pattern carries exactly the seven weekdays
fn validate_weekly_keys(pattern: &WeeklyPattern, context: &str) -> Result<()> {
    let missing: Vec<&str> = Weekday::ALL
        .iter()
        .filter(|d| !pattern.contains_key(d))
        .map(|d| d.as_str())
        .collect();

    if !missing.is_empty() {
        return Err(Error::ShapeMismatch(format!(
            "{} is missing weekday keys: {}",
            context,
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Validate a pattern's internal shape, independent of the declared type
///
/// Weekly and monthly patterns must carry exactly the expected key sets;
/// custom and session entry lists have no structural constraints.
pub fn validate_shape(data: &ScheduleData) -> Result<()> {
    match data {
        ScheduleData::Weekly { days } => validate_weekly_keys(days, "weekly pattern"),
        ScheduleData::Monthly { weeks } => {
            for index in 1..=4u8 {
                match weeks.get(&index) {
                    Some(week) => {
                        validate_weekly_keys(week, &format!("monthly pattern week {}", index))?
                    }
                    None => {
                        return Err(Error::ShapeMismatch(format!(
                            "monthly pattern is missing week {}",
                            index
                        )))
                    }
                }
            }
            if let Some(extra) = weeks.keys().find(|k| !(1..=4).contains(*k)) {
                return Err(Error::ShapeMismatch(format!(
                    "monthly pattern has invalid week index {}",
                    extra
                )));
            }
            Ok(())
        }
        ScheduleData::Custom { .. } | ScheduleData::Session { .. } => Ok(()),
    }
}

/// Validate that the declared type and the pattern shape agree, then the shape
pub fn validate_plan_schedule(schedule_type: ScheduleType, data: &ScheduleData) -> Result<()> {
    if data.schedule_type() != schedule_type {
        return Err(Error::ShapeMismatch(format!(
            "schedule_type is '{}' but schedule_data is shaped as '{}'",
            schedule_type,
            data.schedule_type()
        )));
    }
    validate_shape(data)
}

/// Validate that the end date is strictly after the start date
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start >= end {
        return Err(Error::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Validate the "at least one workout" business rule
///
/// Custom and session schedules only require a non-empty entry list:
/// all-null entries pass here and later materialize to zero sessions.
pub fn validate_not_empty(data: &ScheduleData) -> Result<()> {
    let has_workouts = match data {
        ScheduleData::Weekly { days } => days.values().any(|t| t.is_some()),
        ScheduleData::Monthly { weeks } => weeks
            .values()
            .any(|week| week.values().any(|t| t.is_some())),
        ScheduleData::Custom { entries } => !entries.is_empty(),
        ScheduleData::Session { entries } => !entries.is_empty(),
    };

    if !has_workouts {
        return Err(Error::EmptySchedule);
    }
    Ok(())
}

/// Full pre-save validation of a new or edited plan
pub fn validate_new_plan(plan: &NewPlan) -> Result<()> {
    if plan.name.trim().is_empty() {
        return Err(Error::PlanValidation("plan name must not be blank".into()));
    }
    if plan.client_id.trim().is_empty() {
        return Err(Error::PlanValidation("client must be set".into()));
    }
    validate_date_range(plan.start_date, plan.end_date)?;
    validate_plan_schedule(plan.schedule_type, &plan.schedule_data)?;
    validate_not_empty(&plan.schedule_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CustomEntry, SessionEntry};
    use std::collections::HashMap;

    fn all_rest_week() -> WeeklyPattern {
        Weekday::ALL.iter().map(|d| (*d, None)).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_plan(data: ScheduleData) -> NewPlan {
        NewPlan {
            client_id: "sarah".into(),
            trainer_id: "coach".into(),
            name: "Base Plan".into(),
            description: None,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 14),
            schedule_type: data.schedule_type(),
            schedule_data: data,
        }
    }

    #[test]
    fn test_weekly_missing_day_is_shape_mismatch() {
        let mut days = all_rest_week();
        days.remove(&Weekday::Thursday);
        let result = validate_shape(&ScheduleData::Weekly { days });
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_weekly_complete_pattern_passes() {
        validate_shape(&ScheduleData::Weekly {
            days: all_rest_week(),
        })
        .unwrap();
    }

    #[test]
    fn test_monthly_requires_exactly_four_weeks() {
        let mut weeks: HashMap<u8, WeeklyPattern> =
            (1..=3).map(|w| (w, all_rest_week())).collect();
        let result = validate_shape(&ScheduleData::Monthly {
            weeks: weeks.clone(),
        });
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));

        weeks.insert(4, all_rest_week());
        validate_shape(&ScheduleData::Monthly {
            weeks: weeks.clone(),
        })
        .unwrap();

        weeks.insert(5, all_rest_week());
        let result = validate_shape(&ScheduleData::Monthly { weeks });
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_type_data_disagreement_is_shape_mismatch() {
        let result = validate_plan_schedule(
            ScheduleType::Monthly,
            &ScheduleData::Weekly {
                days: all_rest_week(),
            },
        );
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_date_range_strict() {
        validate_date_range(date(2024, 1, 1), date(2024, 1, 2)).unwrap();
        assert!(matches!(
            validate_date_range(date(2024, 1, 1), date(2024, 1, 1)),
            Err(Error::InvalidDateRange { .. })
        ));
        assert!(matches!(
            validate_date_range(date(2024, 1, 2), date(2024, 1, 1)),
            Err(Error::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_all_rest_weekly_is_empty_schedule() {
        let result = validate_not_empty(&ScheduleData::Weekly {
            days: all_rest_week(),
        });
        assert!(matches!(result, Err(Error::EmptySchedule)));
    }

    #[test]
    fn test_custom_all_null_entries_pass_not_empty() {
        // The original editor only checks list length for custom schedules;
        // all-rest custom plans are accepted and materialize to nothing.
        let data = ScheduleData::Custom {
            entries: vec![CustomEntry {
                id: "c1".into(),
                date: date(2024, 2, 1),
                template_id: None,
                label: "Rest".into(),
            }],
        };
        validate_not_empty(&data).unwrap();
    }

    #[test]
    fn test_empty_session_list_rejected() {
        let result = validate_not_empty(&ScheduleData::Session { entries: vec![] });
        assert!(matches!(result, Err(Error::EmptySchedule)));
    }

    #[test]
    fn test_validate_new_plan_blank_name() {
        let mut plan = test_plan(ScheduleData::Session {
            entries: vec![SessionEntry {
                session_key: "s1".into(),
                template_id: Some("tpl_full_body".into()),
            }],
        });
        plan.name = "   ".into();
        assert!(matches!(
            validate_new_plan(&plan),
            Err(Error::PlanValidation(_))
        ));
    }

    #[test]
    fn test_validate_new_plan_ok() {
        let mut days = all_rest_week();
        days.insert(Weekday::Monday, Some("tpl_full_body".into()));
        validate_new_plan(&test_plan(ScheduleData::Weekly { days })).unwrap();
    }
}
