//! # Time Log Data Transfer Objects

use chrono::{DateTime, NaiveDate, Utc};
use entity::time_logs;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Minutes in a day; a single entry can not exceed it.
pub const MAX_MINUTES_PER_ENTRY: i32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateTimeLogRequest {
    #[validate(range(min = 1, max = 1440, message = "Minutes must be between 1 and 1440"))]
    pub minutes:     i32,
    pub log_date:    NaiveDate,
    #[validate(length(max = 1000, message = "Description must not exceed 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLogResponse {
    pub id:          Uuid,
    pub task_id:     Uuid,
    pub user_id:     Uuid,
    pub minutes:     i32,
    pub log_date:    NaiveDate,
    pub description: Option<String>,
    pub created_at:  DateTime<Utc>,
}

impl From<time_logs::Model> for TimeLogResponse {
    fn from(t: time_logs::Model) -> Self {
        Self {
            id:          t.id,
            task_id:     t.task_id,
            user_id:     t.user_id,
            minutes:     t.minutes,
            log_date:    t.log_date,
            description: t.description,
            created_at:  t.created_at,
        }
    }
}
