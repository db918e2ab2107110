//! # Project Handlers
//!
//! Project CRUD. Creation seeds the member list with the creator as
//! project manager; an update carrying `members` reconciles the stored
//! list against it. Both run in one transaction with the project write.

use auth::membership::{self, check_distinct_members, initial_members};
use chrono::Utc;
use entity::{
    attachments,
    comments,
    milestones,
    project_members,
    projects,
    sea_orm_active_enums::ProjectStatus,
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

use super::{ensure_users_exist, load_project, ok, ApiResult};
use crate::{
    dto::{
        parse_enum,
        projects::{
            check_date_order,
            parse_members,
            CreateProjectRequest,
            ProjectListQuery,
            ProjectResponse,
            ProjectUpdateResponse,
            UpdateProjectRequest,
        },
        MessageResponse,
        Page,
    },
    middleware::AuthenticatedUser,
    AppState,
};

/// Project names are unique; `except` skips the project being renamed.
async fn ensure_name_free<C: ConnectionTrait>(db: &C, name: &str, except: Option<Uuid>) -> Result<()> {
    let mut query = projects::Entity::find().filter(projects::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(projects::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(AppError::conflict("A project with this name already exists"));
    }
    Ok(())
}

pub async fn create_project_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    req: CreateProjectRequest,
) -> ApiResult<ProjectResponse> {
    let principal = &user.principal;
    state.gate().ensure_can_create_project(principal)?;
    req.validate()?;
    check_date_order(req.start_date, req.end_date)?;
    let status = req
        .status
        .as_deref()
        .map(|s| parse_enum("status", s))
        .transpose()?
        .unwrap_or(ProjectStatus::Planning);
    let submitted = parse_members(&req.members)?;
    check_distinct_members(&submitted)?;
    let members = initial_members(principal.id, &submitted);
    let member_ids: Vec<Uuid> = members.iter().map(|(id, _)| *id).collect();

    let name = req.name.trim().to_string();
    let txn = state.db.begin().await?;
    ensure_users_exist(&txn, &member_ids).await?;
    ensure_name_free(&txn, &name, None).await?;

    let now = Utc::now();
    let project = projects::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(req.description),
        status: Set(status),
        start_date: Set(req.start_date),
        end_date: Set(req.end_date),
        created_by: Set(principal.id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    for (user_id, role) in members {
        membership::add_member(&txn, project.id, user_id, role).await?;
    }
    txn.commit().await?;

    info!(project_id = %project.id, user_id = %principal.id, "Project created");
    ok(project.into())
}

pub async fn list_projects_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    query: ProjectListQuery,
) -> ApiResult<Page<ProjectResponse>> {
    let (page, per_page) = query.paging().resolve()?;
    let principal = &user.principal;

    let mut select = projects::Entity::find();
    if let Some(status) = query.status.as_deref() {
        let status: ProjectStatus = parse_enum("status", status)?;
        select = select.filter(projects::Column::Status.eq(status));
    }
    if !principal.roles().is_administrator() {
        let ids = membership::project_ids_for_user(&state.db, principal.id).await?;
        select = select.filter(projects::Column::Id.is_in(ids));
    }

    let paginator = select
        .order_by_asc(projects::Column::Name)
        .paginate(&state.db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator
        .fetch_page(page - 1)
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();
    ok(Page::new(items, page, per_page, total))
}

pub async fn get_project_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
) -> ApiResult<ProjectResponse> {
    let project = load_project(&state.db, project_id).await?;
    state.gate().ensure_can_view(&user.principal, project.id).await?;
    ok(project.into())
}

pub async fn update_project_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
    req: UpdateProjectRequest,
) -> ApiResult<ProjectUpdateResponse> {
    let project = load_project(&state.db, project_id).await?;
    state
        .gate()
        .ensure_can_edit_project(&user.principal, project.id)
        .await?;
    req.validate()?;
    check_date_order(
        req.start_date.or(project.start_date),
        req.end_date.or(project.end_date),
    )?;
    let status: Option<ProjectStatus> = req
        .status
        .as_deref()
        .map(|s| parse_enum("status", s))
        .transpose()?;
    let members = req.members.as_deref().map(parse_members).transpose()?;
    if let Some(members) = &members {
        check_distinct_members(members)?;
    }

    let txn = state.db.begin().await?;
    let mut active = project.into_active_model();
    if let Some(name) = req.name {
        let name = name.trim().to_string();
        ensure_name_free(&txn, &name, Some(project_id)).await?;
        active.name = Set(name);
    }
    if let Some(description) = req.description {
        active.description = Set(Some(description));
    }
    if let Some(status) = status {
        active.status = Set(status);
    }
    if let Some(start_date) = req.start_date {
        active.start_date = Set(Some(start_date));
    }
    if let Some(end_date) = req.end_date {
        active.end_date = Set(Some(end_date));
    }
    active.updated_at = Set(Utc::now());
    let project = active.update(&txn).await?;

    let membership_changes = match members {
        Some(members) => {
            let ids: Vec<Uuid> = members.iter().map(|(id, _)| *id).collect();
            ensure_users_exist(&txn, &ids).await?;
            Some(membership::reconcile_members(&txn, project_id, &members).await?)
        },
        None => None,
    };
    txn.commit().await?;

    info!(project_id = %project_id, user_id = %user.principal.id, "Project updated");
    ok(ProjectUpdateResponse {
        project: project.into(),
        membership_changes,
    })
}

/// Delete a project with everything under it. Rows go in one transaction;
/// attachment files are removed after it commits.
pub async fn delete_project_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
) -> ApiResult<MessageResponse> {
    let project = load_project(&state.db, project_id).await?;
    state
        .gate()
        .ensure_can_delete_project(&user.principal, project.id)
        .await?;

    let txn = state.db.begin().await?;
    let task_ids: Vec<Uuid> = tasks::Entity::find()
        .select_only()
        .column(tasks::Column::Id)
        .filter(tasks::Column::ProjectId.eq(project_id))
        .into_tuple()
        .all(&txn)
        .await?;
    let storage_keys: Vec<String> = attachments::Entity::find()
        .select_only()
        .column(attachments::Column::StorageKey)
        .filter(attachments::Column::TaskId.is_in(task_ids.clone()))
        .into_tuple()
        .all(&txn)
        .await?;

    time_logs::Entity::delete_many()
        .filter(time_logs::Column::TaskId.is_in(task_ids.clone()))
        .exec(&txn)
        .await?;
    comments::Entity::delete_many()
        .filter(comments::Column::TaskId.is_in(task_ids.clone()))
        .exec(&txn)
        .await?;
    attachments::Entity::delete_many()
        .filter(attachments::Column::TaskId.is_in(task_ids))
        .exec(&txn)
        .await?;
    tasks::Entity::delete_many()
        .filter(tasks::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    milestones::Entity::delete_many()
        .filter(milestones::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    project_members::Entity::delete_many()
        .filter(project_members::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    projects::Entity::delete_by_id(project_id).exec(&txn).await?;
    txn.commit().await?;

    state.attachments.remove_all(&storage_keys).await;
    info!(project_id = %project_id, user_id = %user.principal.id, "Project deleted");
    ok(MessageResponse::new("Project deleted"))
}
