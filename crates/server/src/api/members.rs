//! # Project Member Handlers
//!
//! Members are addressed by their user id within the project.

use auth::membership;
use entity::sea_orm_active_enums::ProjectRole;
use uuid::Uuid;

use super::{load_project, load_user, ok, ApiResult};
use crate::{
    dto::{
        parse_enum,
        projects::{AddMemberRequest, MemberResponse, UpdateMemberRequest},
        MessageResponse,
    },
    middleware::AuthenticatedUser,
    AppState,
};

pub async fn list_members_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
) -> ApiResult<Vec<MemberResponse>> {
    load_project(&state.db, project_id).await?;
    state.gate().ensure_can_view(&user.principal, project_id).await?;
    let members = membership::list_members(&state.db, project_id).await?;
    ok(members.into_iter().map(MemberResponse::from).collect())
}

pub async fn add_member_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
    req: AddMemberRequest,
) -> ApiResult<MemberResponse> {
    load_project(&state.db, project_id).await?;
    state
        .gate()
        .ensure_can_edit_project(&user.principal, project_id)
        .await?;
    let role: ProjectRole = parse_enum("role", &req.role)?;
    let member_user = load_user(&state.db, req.user_id).await?;

    let member = membership::add_member(&state.db, project_id, member_user.id, role).await?;
    ok((member, Some(member_user)).into())
}

pub async fn update_member_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
    member_id: Uuid,
    req: UpdateMemberRequest,
) -> ApiResult<MemberResponse> {
    load_project(&state.db, project_id).await?;
    state
        .gate()
        .ensure_can_edit_project(&user.principal, project_id)
        .await?;
    let role: ProjectRole = parse_enum("role", &req.role)?;

    let member = membership::update_member_role(&state.db, project_id, member_id, role).await?;
    let member_user = load_user(&state.db, member_id).await?;
    ok((member, Some(member_user)).into())
}

pub async fn remove_member_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
    member_id: Uuid,
) -> ApiResult<MessageResponse> {
    load_project(&state.db, project_id).await?;
    state
        .gate()
        .ensure_can_edit_project(&user.principal, project_id)
        .await?;
    membership::remove_member(&state.db, project_id, member_id).await?;
    ok(MessageResponse::new("Member removed"))
}
