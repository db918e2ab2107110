//! # Task Data Transfer Objects

use chrono::{DateTime, NaiveDate, Utc};
use entity::{
    sea_orm_active_enums::{TaskPriority, TaskStatus},
    tasks,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::PageParams;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 300, message = "Task title must be between 1 and 300 characters"))]
    pub title:             String,
    #[validate(length(max = 10000, message = "Description must not exceed 10000 characters"))]
    pub description:       Option<String>,
    /// Defaults to `todo`
    pub status:            Option<String>,
    /// Defaults to `medium`
    pub priority:          Option<String>,
    pub milestone_id:      Option<Uuid>,
    pub due_date:          Option<NaiveDate>,
    #[validate(range(min = 0, max = 1_000_000, message = "Estimate must be between 0 and 1000000 minutes"))]
    pub estimated_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 300, message = "Task title must be between 1 and 300 characters"))]
    pub title:             Option<String>,
    #[validate(length(max = 10000, message = "Description must not exceed 10000 characters"))]
    pub description:       Option<String>,
    pub status:            Option<String>,
    pub priority:          Option<String>,
    pub milestone_id:      Option<Uuid>,
    pub due_date:          Option<NaiveDate>,
    #[validate(range(min = 0, max = 1_000_000, message = "Estimate must be between 0 and 1000000 minutes"))]
    pub estimated_minutes: Option<i32>,
}

/// `null` clears the assignee.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignTaskRequest {
    pub assignee_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListQuery {
    pub page:        Option<u64>,
    pub per_page:    Option<u64>,
    pub status:      Option<String>,
    pub assignee_id: Option<Uuid>,
}

impl TaskListQuery {
    pub fn paging(&self) -> PageParams {
        PageParams {
            page:     self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id:                Uuid,
    pub project_id:        Uuid,
    pub milestone_id:      Option<Uuid>,
    pub title:             String,
    pub description:       Option<String>,
    pub status:            TaskStatus,
    pub priority:          TaskPriority,
    pub assignee_id:       Option<Uuid>,
    pub created_by:        Uuid,
    pub due_date:          Option<NaiveDate>,
    pub estimated_minutes: Option<i32>,
    pub created_at:        DateTime<Utc>,
    pub updated_at:        DateTime<Utc>,
}

impl From<tasks::Model> for TaskResponse {
    fn from(t: tasks::Model) -> Self {
        Self {
            id:                t.id,
            project_id:        t.project_id,
            milestone_id:      t.milestone_id,
            title:             t.title,
            description:       t.description,
            status:            t.status,
            priority:          t.priority,
            assignee_id:       t.assignee_id,
            created_by:        t.created_by,
            due_date:          t.due_date,
            estimated_minutes: t.estimated_minutes,
            created_at:        t.created_at,
            updated_at:        t.updated_at,
        }
    }
}
