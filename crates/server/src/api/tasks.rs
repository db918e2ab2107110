//! # Task Handlers

use auth::membership;
use chrono::Utc;
use entity::{
    attachments,
    comments,
    sea_orm_active_enums::{TaskPriority, TaskStatus},
    tasks,
    time_logs,
};
use error::{AppError, Result};
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    IntoActiveModel,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{load_milestone, load_project, load_task, ok, ApiResult};
use crate::{
    dto::{
        parse_enum,
        tasks::{AssignTaskRequest, CreateTaskRequest, TaskListQuery, TaskResponse, UpdateTaskRequest},
        MessageResponse,
        Page,
    },
    middleware::AuthenticatedUser,
    AppState,
};

/// A task's milestone must belong to the task's project.
async fn check_milestone<C: ConnectionTrait>(db: &C, project_id: Uuid, milestone_id: Option<Uuid>) -> Result<()> {
    if let Some(milestone_id) = milestone_id {
        let milestone = load_milestone(db, milestone_id).await?;
        if milestone.project_id != project_id {
            return Err(AppError::validation("Milestone belongs to a different project"));
        }
    }
    Ok(())
}

pub async fn list_tasks_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
    query: TaskListQuery,
) -> ApiResult<Page<TaskResponse>> {
    load_project(&state.db, project_id).await?;
    state.gate().ensure_can_view(&user.principal, project_id).await?;
    let (page, per_page) = query.paging().resolve()?;

    let mut select = tasks::Entity::find().filter(tasks::Column::ProjectId.eq(project_id));
    if let Some(status) = query.status.as_deref() {
        let status: TaskStatus = parse_enum("status", status)?;
        select = select.filter(tasks::Column::Status.eq(status));
    }
    if let Some(assignee_id) = query.assignee_id {
        select = select.filter(tasks::Column::AssigneeId.eq(assignee_id));
    }

    let paginator = select
        .order_by_desc(tasks::Column::CreatedAt)
        .order_by_asc(tasks::Column::Id)
        .paginate(&state.db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator
        .fetch_page(page - 1)
        .await?
        .into_iter()
        .map(TaskResponse::from)
        .collect();
    ok(Page::new(items, page, per_page, total))
}

pub async fn create_task_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
    req: CreateTaskRequest,
) -> ApiResult<TaskResponse> {
    load_project(&state.db, project_id).await?;
    state
        .gate()
        .ensure_can_modify_resource(&user.principal, project_id)
        .await?;
    req.validate()?;
    let status = req
        .status
        .as_deref()
        .map(|s| parse_enum("status", s))
        .transpose()?
        .unwrap_or(TaskStatus::Todo);
    let priority = req
        .priority
        .as_deref()
        .map(|s| parse_enum("priority", s))
        .transpose()?
        .unwrap_or(TaskPriority::Medium);
    check_milestone(&state.db, project_id, req.milestone_id).await?;

    let now = Utc::now();
    let task = tasks::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project_id),
        milestone_id: Set(req.milestone_id),
        title: Set(req.title.trim().to_string()),
        description: Set(req.description),
        status: Set(status),
        priority: Set(priority),
        assignee_id: Set(None),
        created_by: Set(user.principal.id),
        due_date: Set(req.due_date),
        estimated_minutes: Set(req.estimated_minutes),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(project_id = %project_id, task_id = %task.id, user_id = %user.principal.id, "Task created");
    ok(task.into())
}

pub async fn get_task_handler(state: &AppState, user: &AuthenticatedUser, task_id: Uuid) -> ApiResult<TaskResponse> {
    let task = load_task(&state.db, task_id).await?;
    state
        .gate()
        .ensure_can_view(&user.principal, task.project_id)
        .await?;
    ok(task.into())
}

pub async fn update_task_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
    req: UpdateTaskRequest,
) -> ApiResult<TaskResponse> {
    let task = load_task(&state.db, task_id).await?;
    state
        .gate()
        .ensure_can_modify_resource(&user.principal, task.project_id)
        .await?;
    req.validate()?;
    let status: Option<TaskStatus> = req
        .status
        .as_deref()
        .map(|s| parse_enum("status", s))
        .transpose()?;
    let priority: Option<TaskPriority> = req
        .priority
        .as_deref()
        .map(|s| parse_enum("priority", s))
        .transpose()?;
    check_milestone(&state.db, task.project_id, req.milestone_id).await?;

    let mut active = task.into_active_model();
    if let Some(title) = req.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = req.description {
        active.description = Set(Some(description));
    }
    if let Some(status) = status {
        active.status = Set(status);
    }
    if let Some(priority) = priority {
        active.priority = Set(priority);
    }
    if let Some(milestone_id) = req.milestone_id {
        active.milestone_id = Set(Some(milestone_id));
    }
    if let Some(due_date) = req.due_date {
        active.due_date = Set(Some(due_date));
    }
    if let Some(estimate) = req.estimated_minutes {
        active.estimated_minutes = Set(Some(estimate));
    }
    active.updated_at = Set(Utc::now());
    let task = active.update(&state.db).await?;

    info!(task_id = %task.id, user_id = %user.principal.id, "Task updated");
    ok(task.into())
}

/// Set or clear the assignee. Assigning is a global project-manager-tier
/// right on a visible project; the assignee must belong to the task's project.
pub async fn assign_task_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
    req: AssignTaskRequest,
) -> ApiResult<TaskResponse> {
    let task = load_task(&state.db, task_id).await?;
    let gate = state.gate();
    gate.ensure_can_view(&user.principal, task.project_id).await?;
    gate.ensure_can_assign_task(&user.principal)?;
    if let Some(assignee_id) = req.assignee_id {
        if !membership::has_membership(&state.db, task.project_id, assignee_id).await? {
            return Err(AppError::validation("Assignee must be a member of the project"));
        }
    }

    let mut active = task.into_active_model();
    active.assignee_id = Set(req.assignee_id);
    active.updated_at = Set(Utc::now());
    let task = active.update(&state.db).await?;

    match task.assignee_id {
        Some(assignee_id) => info!(task_id = %task.id, assignee_id = %assignee_id, "Task assigned"),
        None => info!(task_id = %task.id, "Task unassigned"),
    }
    ok(task.into())
}

/// Delete a task with its comments, attachments and time logs.
pub async fn delete_task_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
) -> ApiResult<MessageResponse> {
    let task = load_task(&state.db, task_id).await?;
    state
        .gate()
        .ensure_can_delete_resource(&user.principal, task.project_id, task.created_by)
        .await?;

    let txn = state.db.begin().await?;
    let storage_keys: Vec<String> = attachments::Entity::find()
        .select_only()
        .column(attachments::Column::StorageKey)
        .filter(attachments::Column::TaskId.eq(task_id))
        .into_tuple()
        .all(&txn)
        .await?;
    time_logs::Entity::delete_many()
        .filter(time_logs::Column::TaskId.eq(task_id))
        .exec(&txn)
        .await?;
    comments::Entity::delete_many()
        .filter(comments::Column::TaskId.eq(task_id))
        .exec(&txn)
        .await?;
    attachments::Entity::delete_many()
        .filter(attachments::Column::TaskId.eq(task_id))
        .exec(&txn)
        .await?;
    tasks::Entity::delete_by_id(task_id).exec(&txn).await?;
    txn.commit().await?;

    state.attachments.remove_all(&storage_keys).await;
    info!(task_id = %task_id, user_id = %user.principal.id, "Task deleted");
    ok(MessageResponse::new("Task deleted"))
}
