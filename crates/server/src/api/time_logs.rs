//! # Time Log Handlers

use chrono::Utc;
use entity::time_logs;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{load_task, load_time_log, ok, ApiResult};
use crate::{
    dto::{
        time_logs::{CreateTimeLogRequest, TimeLogResponse},
        MessageResponse,
    },
    middleware::AuthenticatedUser,
    AppState,
};

pub async fn list_time_logs_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
) -> ApiResult<Vec<TimeLogResponse>> {
    let task = load_task(&state.db, task_id).await?;
    state
        .gate()
        .ensure_can_view(&user.principal, task.project_id)
        .await?;
    let items = time_logs::Entity::find()
        .filter(time_logs::Column::TaskId.eq(task_id))
        .order_by_desc(time_logs::Column::LogDate)
        .order_by_desc(time_logs::Column::CreatedAt)
        .all(&state.db)
        .await?;
    ok(items.into_iter().map(TimeLogResponse::from).collect())
}

/// Log time against a task as the current user.
pub async fn create_time_log_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
    req: CreateTimeLogRequest,
) -> ApiResult<TimeLogResponse> {
    let task = load_task(&state.db, task_id).await?;
    state
        .gate()
        .ensure_can_modify_resource(&user.principal, task.project_id)
        .await?;
    req.validate()?;

    let log = time_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        task_id: Set(task_id),
        user_id: Set(user.principal.id),
        minutes: Set(req.minutes),
        log_date: Set(req.log_date),
        description: Set(req.description),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!(task_id = %task_id, user_id = %user.principal.id, minutes = log.minutes, "Time logged");
    ok(log.into())
}

pub async fn delete_time_log_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    time_log_id: Uuid,
) -> ApiResult<MessageResponse> {
    let log = load_time_log(&state.db, time_log_id).await?;
    let task = load_task(&state.db, log.task_id).await?;
    state
        .gate()
        .ensure_can_delete_resource(&user.principal, task.project_id, log.user_id)
        .await?;

    time_logs::Entity::delete_by_id(time_log_id)
        .exec(&state.db)
        .await?;
    info!(time_log_id = %time_log_id, user_id = %user.principal.id, "Time log deleted");
    ok(MessageResponse::new("Time log deleted"))
}
