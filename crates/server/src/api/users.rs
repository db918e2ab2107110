//! # User Handlers
//!
//! Profile lookup and administrator-only account management. Accounts are
//! never deleted, only deactivated.

use chrono::Utc;
use entity::{sea_orm_active_enums::GlobalRole, users};
use error::{AppError, Result};
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait,
    Condition,
    EntityTrait,
    IntoActiveModel,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
    Set,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{escape_like, load_user, ok, ApiResult};
use crate::{
    dto::{
        parse_enum,
        users::{UpdateRoleRequest, UserListQuery, UserResponse},
        Page,
    },
    middleware::AuthenticatedUser,
    AppState,
};

pub async fn me_handler(state: &AppState, user: &AuthenticatedUser) -> ApiResult<UserResponse> {
    ok(load_user(&state.db, user.principal.id).await?.into())
}

fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&term.trim().to_lowercase()));
    let like = |column: users::Column| {
        Expr::expr(Func::lower(Expr::col((users::Entity, column))))
            .like(LikeExpr::new(pattern.clone()).escape('\\'))
    };
    Condition::any()
        .add(like(users::Column::Email))
        .add(like(users::Column::FullName))
}

pub async fn list_users_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    query: UserListQuery,
) -> ApiResult<Page<UserResponse>> {
    state.gate().ensure_administrator(&user.principal)?;
    query.validate()?;
    let (page, per_page) = query.paging().resolve()?;

    let mut select = users::Entity::find();
    if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
        select = select.filter(search_condition(term));
    }

    let paginator = select
        .order_by_asc(users::Column::Email)
        .paginate(&state.db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator
        .fetch_page(page - 1)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    ok(Page::new(items, page, per_page, total))
}

async fn save_user(state: &AppState, mut user: users::ActiveModel) -> Result<users::Model> {
    user.updated_at = Set(Utc::now());
    Ok(user.update(&state.db).await?)
}

pub async fn update_role_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    user_id: Uuid,
    req: UpdateRoleRequest,
) -> ApiResult<UserResponse> {
    state.gate().ensure_administrator(&user.principal)?;
    req.validate()?;
    let role: GlobalRole = parse_enum("role", &req.role)?;
    let target = load_user(&state.db, user_id).await?;

    if target.id == user.principal.id && role != GlobalRole::Administrator {
        return Err(AppError::validation("Administrators cannot remove their own administrator role"));
    }
    if target.role == role {
        return ok(target.into());
    }

    let mut active = target.into_active_model();
    active.role = Set(role);
    let updated = save_user(state, active).await?;

    info!(user_id = %updated.id, role = %role, changed_by = %user.principal.id, "User role changed");
    ok(updated.into())
}

pub async fn deactivate_user_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    user_id: Uuid,
) -> ApiResult<UserResponse> {
    state.gate().ensure_administrator(&user.principal)?;
    if user_id == user.principal.id {
        return Err(AppError::validation("You cannot deactivate your own account"));
    }
    let target = load_user(&state.db, user_id).await?;
    if !target.is_active {
        return ok(target.into());
    }

    let mut active = target.into_active_model();
    active.is_active = Set(false);
    let updated = save_user(state, active).await?;

    info!(user_id = %updated.id, changed_by = %user.principal.id, "User deactivated");
    ok(updated.into())
}
