//! Projects Entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ProjectStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:          Uuid,
    #[sea_orm(unique)]
    pub name:        String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status:      ProjectStatus,
    pub start_date:  Option<Date>,
    pub end_date:    Option<Date>,
    pub created_by:  Uuid,
    pub created_at:  DateTimeUtc,
    pub updated_at:  DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Creator,
    #[sea_orm(has_many = "super::project_members::Entity")]
    Members,
    #[sea_orm(has_many = "super::milestones::Entity")]
    Milestones,
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
}

impl Related<super::project_members::Entity> for Entity {
    fn to() -> RelationDef { Relation::Members.def() }
}

impl Related<super::milestones::Entity> for Entity {
    fn to() -> RelationDef { Relation::Milestones.def() }
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef { Relation::Tasks.def() }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { super::project_members::Relation::User.def() }

    fn via() -> Option<RelationDef> { Some(super::project_members::Relation::Project.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}
