//! # Analytics Data Transfer Objects

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use error::{AppError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest range a time series may cover, in days.
pub const MAX_RANGE_DAYS: i64 = 366;
/// Range used when the caller gives no bounds.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<NaiveDate>,
    pub to:   Option<NaiveDate>,
}

impl DateRangeQuery {
    /// Inclusive `(from, to)`. A missing `to` is `today`; a missing `from`
    /// covers the default range ending at `to`.
    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let to = self.to.unwrap_or(today);
        let from = match self.from {
            Some(from) => from,
            None => {
                to.checked_sub_signed(Duration::days(DEFAULT_RANGE_DAYS - 1))
                    .ok_or_else(|| AppError::validation("to is too far in the past"))?
            },
        };
        if from > to {
            return Err(AppError::validation("from must not be after to"));
        }
        if (to - from).num_days() + 1 > MAX_RANGE_DAYS {
            return Err(AppError::validation(format!(
                "Date range must not exceed {MAX_RANGE_DAYS} days"
            )));
        }
        Ok((from, to))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberHours {
    pub user_id:   Uuid,
    pub full_name: Option<String>,
    pub hours:     f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id:            Uuid,
    pub total_tasks:           u64,
    /// Every status appears, with zero when no task has it
    pub tasks_by_status:       BTreeMap<String, u64>,
    pub completed_tasks:       u64,
    /// Share of `done` tasks, 0-100 with two decimals
    pub completion_percentage: f64,
    /// Tasks past their due date and not done
    pub overdue_tasks:         u64,
    pub total_hours:           f64,
    pub hours_by_member:       Vec<MemberHours>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyHours {
    pub date:  NaiveDate,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub from:        NaiveDate,
    pub to:          NaiveDate,
    pub total_hours: f64,
    /// One entry per day of the range
    pub days:        Vec<DailyHours>,
}
