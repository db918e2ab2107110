//! Tasks Entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{TaskPriority, TaskStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                Uuid,
    pub project_id:        Uuid,
    /// Must reference a milestone of the same project.
    pub milestone_id:      Option<Uuid>,
    pub title:             String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description:       Option<String>,
    pub status:            TaskStatus,
    pub priority:          TaskPriority,
    pub assignee_id:       Option<Uuid>,
    pub created_by:        Uuid,
    pub due_date:          Option<Date>,
    pub estimated_minutes: Option<i32>,
    pub created_at:        DateTimeUtc,
    pub updated_at:        DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::milestones::Entity",
        from = "Column::MilestoneId",
        to = "super::milestones::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Milestone,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
    #[sea_orm(has_many = "super::attachments::Entity")]
    Attachments,
    #[sea_orm(has_many = "super::time_logs::Entity")]
    TimeLogs,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef { Relation::Project.def() }
}

impl Related<super::milestones::Entity> for Entity {
    fn to() -> RelationDef { Relation::Milestone.def() }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef { Relation::Comments.def() }
}

impl Related<super::attachments::Entity> for Entity {
    fn to() -> RelationDef { Relation::Attachments.def() }
}

impl Related<super::time_logs::Entity> for Entity {
    fn to() -> RelationDef { Relation::TimeLogs.def() }
}

impl ActiveModelBehavior for ActiveModel {}
