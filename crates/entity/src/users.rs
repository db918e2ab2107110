//! Users Entity
//!
//! Accounts never get deleted; deactivation clears `is_active`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::GlobalRole;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:            Uuid,
    /// Login identifier, stored lower-cased.
    #[sea_orm(unique)]
    pub email:         String,
    pub full_name:     String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role:          GlobalRole,
    pub is_active:     bool,
    pub created_at:    DateTimeUtc,
    pub updated_at:    DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_members::Entity")]
    ProjectMembers,
    #[sea_orm(has_many = "super::time_logs::Entity")]
    TimeLogs,
}

impl Related<super::project_members::Entity> for Entity {
    fn to() -> RelationDef { Relation::ProjectMembers.def() }
}

impl Related<super::time_logs::Entity> for Entity {
    fn to() -> RelationDef { Relation::TimeLogs.def() }
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef { super::project_members::Relation::Project.def() }

    fn via() -> Option<RelationDef> { Some(super::project_members::Relation::User.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}
