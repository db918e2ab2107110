//! # Milestone Data Transfer Objects

use chrono::{DateTime, NaiveDate, Utc};
use entity::{milestones, sea_orm_active_enums::MilestoneStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateMilestoneRequest {
    #[validate(length(min = 1, max = 200, message = "Milestone name must be between 1 and 200 characters"))]
    pub name:        String,
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,
    pub due_date:    Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateMilestoneRequest {
    #[validate(length(min = 1, max = 200, message = "Milestone name must be between 1 and 200 characters"))]
    pub name:        Option<String>,
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,
    pub due_date:    Option<NaiveDate>,
    pub status:      Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneResponse {
    pub id:          Uuid,
    pub project_id:  Uuid,
    pub name:        String,
    pub description: Option<String>,
    pub due_date:    Option<NaiveDate>,
    pub status:      MilestoneStatus,
    pub created_by:  Uuid,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  DateTime<Utc>,
}

impl From<milestones::Model> for MilestoneResponse {
    fn from(m: milestones::Model) -> Self {
        Self {
            id:          m.id,
            project_id:  m.project_id,
            name:        m.name,
            description: m.description,
            due_date:    m.due_date,
            status:      m.status,
            created_by:  m.created_by,
            created_at:  m.created_at,
            updated_at:  m.updated_at,
        }
    }
}
