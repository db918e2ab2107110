//! # Comment Handlers

use chrono::Utc;
use entity::comments;
use error::AppError;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{load_comment, load_task, ok, ApiResult};
use crate::{
    dto::{
        comments::{CommentRequest, CommentResponse},
        MessageResponse,
    },
    middleware::AuthenticatedUser,
    AppState,
};

pub async fn list_comments_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
) -> ApiResult<Vec<CommentResponse>> {
    let task = load_task(&state.db, task_id).await?;
    state
        .gate()
        .ensure_can_view(&user.principal, task.project_id)
        .await?;
    let items = comments::Entity::find()
        .filter(comments::Column::TaskId.eq(task_id))
        .order_by_asc(comments::Column::CreatedAt)
        .all(&state.db)
        .await?;
    ok(items.into_iter().map(CommentResponse::from).collect())
}

pub async fn create_comment_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
    req: CommentRequest,
) -> ApiResult<CommentResponse> {
    let task = load_task(&state.db, task_id).await?;
    state
        .gate()
        .ensure_can_modify_resource(&user.principal, task.project_id)
        .await?;
    req.validate()?;

    let now = Utc::now();
    let comment = comments::ActiveModel {
        id: Set(Uuid::new_v4()),
        task_id: Set(task_id),
        author_id: Set(user.principal.id),
        body: Set(req.body),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(task_id = %task_id, comment_id = %comment.id, "Comment added");
    ok(comment.into())
}

/// Only the author edits a comment's text.
pub async fn update_comment_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    comment_id: Uuid,
    req: CommentRequest,
) -> ApiResult<CommentResponse> {
    let comment = load_comment(&state.db, comment_id).await?;
    let task = load_task(&state.db, comment.task_id).await?;
    state
        .gate()
        .ensure_can_modify_resource(&user.principal, task.project_id)
        .await?;
    if comment.author_id != user.principal.id {
        return Err(AppError::forbidden("Only the author can edit a comment"));
    }
    req.validate()?;

    let mut active = comment.into_active_model();
    active.body = Set(req.body);
    active.updated_at = Set(Utc::now());
    let comment = active.update(&state.db).await?;
    ok(comment.into())
}

pub async fn delete_comment_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    comment_id: Uuid,
) -> ApiResult<MessageResponse> {
    let comment = load_comment(&state.db, comment_id).await?;
    let task = load_task(&state.db, comment.task_id).await?;
    state
        .gate()
        .ensure_can_delete_resource(&user.principal, task.project_id, comment.author_id)
        .await?;

    comments::Entity::delete_by_id(comment_id)
        .exec(&state.db)
        .await?;
    info!(comment_id = %comment_id, user_id = %user.principal.id, "Comment deleted");
    ok(MessageResponse::new("Comment deleted"))
}
