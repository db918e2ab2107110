//! # Project Data Transfer Objects

use auth::membership::ReconcileOutcome;
use chrono::{DateTime, NaiveDate, Utc};
use entity::{
    project_members,
    projects,
    sea_orm_active_enums::{ProjectRole, ProjectStatus},
    users,
};
use error::{AppError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{parse_enum, PageParams};

/// One entry of a submitted member list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInput {
    pub user_id: Uuid,
    pub role:    String,
}

/// Parse a submitted member list into typed pairs.
pub fn parse_members(members: &[MemberInput]) -> Result<Vec<(Uuid, ProjectRole)>> {
    members
        .iter()
        .map(|m| Ok((m.user_id, parse_enum("role", &m.role)?)))
        .collect()
}

/// `end` may not precede `start` when both are set.
pub fn check_date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::validation("end_date must not be before start_date")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Project name must be between 1 and 200 characters"))]
    pub name:        String,
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,
    /// Defaults to `planning`
    pub status:      Option<String>,
    pub start_date:  Option<NaiveDate>,
    pub end_date:    Option<NaiveDate>,
    /// Initial members besides the creator
    #[serde(default)]
    pub members:     Vec<MemberInput>,
}

/// Field-by-field update; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Project name must be between 1 and 200 characters"))]
    pub name:        Option<String>,
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,
    pub status:      Option<String>,
    pub start_date:  Option<NaiveDate>,
    pub end_date:    Option<NaiveDate>,
    /// When present, replaces the member list
    pub members:     Option<Vec<MemberInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListQuery {
    pub page:     Option<u64>,
    pub per_page: Option<u64>,
    pub status:   Option<String>,
}

impl ProjectListQuery {
    pub fn paging(&self) -> PageParams {
        PageParams {
            page:     self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub id:          Uuid,
    pub name:        String,
    pub description: Option<String>,
    pub status:      ProjectStatus,
    pub start_date:  Option<NaiveDate>,
    pub end_date:    Option<NaiveDate>,
    pub created_by:  Uuid,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  DateTime<Utc>,
}

impl From<projects::Model> for ProjectResponse {
    fn from(p: projects::Model) -> Self {
        Self {
            id:          p.id,
            name:        p.name,
            description: p.description,
            status:      p.status,
            start_date:  p.start_date,
            end_date:    p.end_date,
            created_by:  p.created_by,
            created_at:  p.created_at,
            updated_at:  p.updated_at,
        }
    }
}

/// Result of a project update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectUpdateResponse {
    pub project:            ProjectResponse,
    /// Present when the request replaced the member list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_changes: Option<ReconcileOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberResponse {
    pub user_id:   Uuid,
    pub email:     Option<String>,
    pub full_name: Option<String>,
    pub role:      ProjectRole,
    pub joined_at: DateTime<Utc>,
}

impl From<(project_members::Model, Option<users::Model>)> for MemberResponse {
    fn from((member, user): (project_members::Model, Option<users::Model>)) -> Self {
        let (email, full_name) = user.map(|u| (u.email, u.full_name)).unzip();
        Self {
            user_id: member.user_id,
            email,
            full_name,
            role: member.role,
            joined_at: member.joined_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role:    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateMemberRequest {
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_date_order() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 3, day);
        assert!(check_date_order(d(1), d(1)).is_ok());
        assert!(check_date_order(d(1), d(2)).is_ok());
        assert!(check_date_order(None, d(2)).is_ok());
        assert!(matches!(check_date_order(d(2), d(1)), Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_parse_members() {
        let id = Uuid::new_v4();
        let parsed = parse_members(&[MemberInput {
            user_id: id,
            role:    "TEAM_LEAD".to_string(),
        }])
        .unwrap();
        assert_eq!(parsed, vec![(id, ProjectRole::TeamLead)]);

        assert!(parse_members(&[MemberInput {
            user_id: id,
            role:    "OWNER".to_string(),
        }])
        .is_err());
    }

    #[test]
    fn test_create_request_members_default_empty() {
        let req: CreateProjectRequest = serde_json::from_str(r#"{"name":"Apollo"}"#).unwrap();
        assert!(req.members.is_empty());
        assert!(req.validate().is_ok());
        let blank: CreateProjectRequest = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(blank.validate().is_err());
    }
}
