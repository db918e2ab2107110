//! # Milestone Handlers

use chrono::Utc;
use entity::{milestones, sea_orm_active_enums::MilestoneStatus, tasks};
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait,
    ColumnTrait,
    EntityTrait,
    IntoActiveModel,
    QueryFilter,
    QueryOrder,
    Set,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{load_milestone, load_project, ok, ApiResult};
use crate::{
    dto::{
        milestones::{CreateMilestoneRequest, MilestoneResponse, UpdateMilestoneRequest},
        parse_enum,
        MessageResponse,
    },
    middleware::AuthenticatedUser,
    AppState,
};

pub async fn list_milestones_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
) -> ApiResult<Vec<MilestoneResponse>> {
    load_project(&state.db, project_id).await?;
    state.gate().ensure_can_view(&user.principal, project_id).await?;
    let items = milestones::Entity::find()
        .filter(milestones::Column::ProjectId.eq(project_id))
        .order_by_asc(milestones::Column::CreatedAt)
        .all(&state.db)
        .await?;
    ok(items.into_iter().map(MilestoneResponse::from).collect())
}

pub async fn create_milestone_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
    req: CreateMilestoneRequest,
) -> ApiResult<MilestoneResponse> {
    load_project(&state.db, project_id).await?;
    state
        .gate()
        .ensure_can_modify_resource(&user.principal, project_id)
        .await?;
    req.validate()?;

    let now = Utc::now();
    let milestone = milestones::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project_id),
        name: Set(req.name.trim().to_string()),
        description: Set(req.description),
        due_date: Set(req.due_date),
        status: Set(MilestoneStatus::Open),
        created_by: Set(user.principal.id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(project_id = %project_id, milestone_id = %milestone.id, "Milestone created");
    ok(milestone.into())
}

pub async fn get_milestone_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    milestone_id: Uuid,
) -> ApiResult<MilestoneResponse> {
    let milestone = load_milestone(&state.db, milestone_id).await?;
    state
        .gate()
        .ensure_can_view(&user.principal, milestone.project_id)
        .await?;
    ok(milestone.into())
}

pub async fn update_milestone_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    milestone_id: Uuid,
    req: UpdateMilestoneRequest,
) -> ApiResult<MilestoneResponse> {
    let milestone = load_milestone(&state.db, milestone_id).await?;
    state
        .gate()
        .ensure_can_modify_resource(&user.principal, milestone.project_id)
        .await?;
    req.validate()?;
    let status: Option<MilestoneStatus> = req
        .status
        .as_deref()
        .map(|s| parse_enum("status", s))
        .transpose()?;

    let mut active = milestone.into_active_model();
    if let Some(name) = req.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = req.description {
        active.description = Set(Some(description));
    }
    if let Some(due_date) = req.due_date {
        active.due_date = Set(Some(due_date));
    }
    if let Some(status) = status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now());
    let milestone = active.update(&state.db).await?;

    info!(milestone_id = %milestone.id, user_id = %user.principal.id, "Milestone updated");
    ok(milestone.into())
}

/// Tasks of a deleted milestone stay in the project, unscheduled.
pub async fn delete_milestone_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    milestone_id: Uuid,
) -> ApiResult<MessageResponse> {
    let milestone = load_milestone(&state.db, milestone_id).await?;
    state
        .gate()
        .ensure_can_delete_resource(&user.principal, milestone.project_id, milestone.created_by)
        .await?;

    let txn = state.db.begin().await?;
    tasks::Entity::update_many()
        .col_expr(tasks::Column::MilestoneId, Expr::value(Option::<Uuid>::None))
        .filter(tasks::Column::MilestoneId.eq(milestone_id))
        .exec(&txn)
        .await?;
    milestones::Entity::delete_by_id(milestone_id).exec(&txn).await?;
    txn.commit().await?;

    info!(milestone_id = %milestone_id, user_id = %user.principal.id, "Milestone deleted");
    ok(MessageResponse::new("Milestone deleted"))
}
