//! # Request Handlers
//!
//! One module per resource. Handlers take the state and the authenticated
//! user by reference and are wrapped by thin extractor functions in
//! [`crate::router`]. Every permission check goes through the
//! [`AccessGate`](::auth::AccessGate); handlers load the owning record first so an
//! unknown id is `NotFound` before it can be `Forbidden`.

use axum::Json;
use entity::{
    attachments as attachment,
    comments as comment,
    milestones as milestone,
    projects as project,
    tasks as task,
    time_logs as time_log,
    users as user,
};
use error::{ApiResponse, OptionExt, Result};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

pub mod analytics;
pub mod attachments;
pub mod comments;
pub mod members;
pub mod milestones;
pub mod projects;
pub mod session;
pub mod tasks;
pub mod time_logs;
pub mod users;

/// JSON success envelope returned by every handler.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>>;

#[inline]
pub(crate) fn ok<T>(data: T) -> ApiResult<T> { Ok(Json(ApiResponse::success(data))) }

pub(crate) async fn load_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<user::Model> {
    user::Entity::find_by_id(id).one(db).await?.or_not_found("User not found")
}

pub(crate) async fn load_project<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<project::Model> {
    project::Entity::find_by_id(id)
        .one(db)
        .await?
        .or_not_found("Project not found")
}

pub(crate) async fn load_milestone<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<milestone::Model> {
    milestone::Entity::find_by_id(id)
        .one(db)
        .await?
        .or_not_found("Milestone not found")
}

pub(crate) async fn load_task<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<task::Model> {
    task::Entity::find_by_id(id).one(db).await?.or_not_found("Task not found")
}

pub(crate) async fn load_comment<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<comment::Model> {
    comment::Entity::find_by_id(id)
        .one(db)
        .await?
        .or_not_found("Comment not found")
}

pub(crate) async fn load_attachment<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<attachment::Model> {
    attachment::Entity::find_by_id(id)
        .one(db)
        .await?
        .or_not_found("Attachment not found")
}

pub(crate) async fn load_time_log<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<time_log::Model> {
    time_log::Entity::find_by_id(id)
        .one(db)
        .await?
        .or_not_found("Time log not found")
}

/// Every id in `ids` must name an existing account.
pub(crate) async fn ensure_users_exist<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = user::Entity::find()
        .filter(user::Column::Id.is_in(ids.iter().copied()))
        .count(db)
        .await?;
    if found != ids.len() as u64 {
        return Err(error::AppError::not_found("One or more listed users do not exist"));
    }
    Ok(())
}

/// Escape `%`, `_` and `\` for a LIKE pattern using `\` as escape.
pub(crate) fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
