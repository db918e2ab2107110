//! Closed enumerations persisted as fixed string literals.
//!
//! Columns are plain strings rather than native database enums so the same
//! schema runs on PostgreSQL and SQLite.

use std::{fmt, str::FromStr};

use sea_orm::{entity::prelude::*, Iterable};
use serde::{Deserialize, Serialize};

/// Returned when a string does not name any variant of an enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind:  &'static str,
    pub value: String,
}

/// Match `input` against the persisted literals of `E`.
///
/// Comparison ignores case and treats `-` and spaces as `_`, so
/// `"team-lead"`, `"Team Lead"` and `"TEAM_LEAD"` are the same value.
fn parse_variant<E>(kind: &'static str, input: &str) -> Result<E, UnknownVariant>
where
    E: ActiveEnum<Value = String> + Iterable,
{
    let wanted: String = input
        .trim()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect();
    E::iter()
        .find(|variant| variant.to_value().eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| {
            UnknownVariant {
                kind,
                value: input.to_string(),
            }
        })
}

macro_rules! string_enum_impls {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_value()) }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> { parse_variant($kind, s) }
        }
    };
}

/// Account-wide role. Exactly one per user.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalRole {
    #[sea_orm(string_value = "ADMINISTRATOR")]
    Administrator,
    #[sea_orm(string_value = "PROJECT_MANAGER")]
    ProjectManager,
    #[sea_orm(string_value = "TEAM_LEAD")]
    TeamLead,
    #[sea_orm(string_value = "DEVELOPER")]
    Developer,
    #[sea_orm(string_value = "QA")]
    Qa,
}

string_enum_impls!(GlobalRole, "role");

impl GlobalRole {
    /// Prefix used by granted-authority tags.
    pub const TAG_PREFIX: &'static str = "ROLE_";

    /// The granted-authority tag, e.g. `ROLE_TEAM_LEAD`.
    pub fn tag(self) -> String { format!("{}{}", Self::TAG_PREFIX, self.to_value()) }
}

/// Role a user holds inside one project.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRole {
    #[sea_orm(string_value = "PROJECT_MANAGER")]
    ProjectManager,
    #[sea_orm(string_value = "TEAM_LEAD")]
    TeamLead,
    #[sea_orm(string_value = "DEVELOPER")]
    Developer,
    #[sea_orm(string_value = "QA")]
    Qa,
}

string_enum_impls!(ProjectRole, "project role");

impl ProjectRole {
    /// Roles allowed to edit project settings and membership.
    #[inline]
    pub fn is_elevated(self) -> bool { matches!(self, Self::ProjectManager | Self::TeamLead) }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[sea_orm(string_value = "planning")]
    Planning,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "archived")]
    Archived,
}

string_enum_impls!(ProjectStatus, "project status");

/// Task workflow state. `Done` is the only terminal state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[sea_orm(string_value = "todo")]
    Todo,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "in_review")]
    InReview,
    #[sea_orm(string_value = "done")]
    Done,
}

string_enum_impls!(TaskStatus, "task status");

impl TaskStatus {
    #[inline]
    pub fn is_done(self) -> bool { self == Self::Done }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

string_enum_impls!(TaskPriority, "task priority");

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "completed")]
    Completed,
}

string_enum_impls!(MilestoneStatus, "milestone status");
