//! # API Router Configuration
//!
//! Thin extractor wrappers around the handlers in [`crate::api`], split into
//! public and authenticated route sets under `/api/v1`.

use axum::{
    extract::{DefaultBodyLimit, Extension, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    handler::Handler,
    middleware,
    response::Response,
    routing::{get, post, put},
    Json,
    Router,
};
use error::{ApiResponse, Result};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{
    api::{self, ApiResult},
    dto::{
        analytics::{DateRangeQuery, ProjectSummary, TimeSeries},
        attachments::{AttachmentResponse, UploadQuery},
        auth::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, TokenResponse},
        comments::{CommentRequest, CommentResponse},
        milestones::{CreateMilestoneRequest, MilestoneResponse, UpdateMilestoneRequest},
        projects::{
            AddMemberRequest,
            CreateProjectRequest,
            MemberResponse,
            ProjectListQuery,
            ProjectResponse,
            ProjectUpdateResponse,
            UpdateMemberRequest,
            UpdateProjectRequest,
        },
        tasks::{AssignTaskRequest, CreateTaskRequest, TaskListQuery, TaskResponse, UpdateTaskRequest},
        time_logs::{CreateTimeLogRequest, TimeLogResponse},
        users::{UpdateRoleRequest, UserListQuery, UserResponse},
        MessageResponse,
        Page,
    },
    extract::{ApiBytes, ApiJson, ApiPath, ApiQuery},
    middleware::{auth_middleware, request_id_middleware, AuthenticatedUser},
    AppState,
};

type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>)>;

fn created<T>(result: ApiResult<T>) -> Created<T> { result.map(|body| (StatusCode::CREATED, body)) }

type Auth = Extension<AuthenticatedUser>;

// ---- auth ----

async fn register(State(state): State<AppState>, ApiJson(req): ApiJson<RegisterRequest>) -> Created<UserResponse> {
    created(api::session::register_handler(&state, req).await)
}

async fn login(State(state): State<AppState>, ApiJson(req): ApiJson<LoginRequest>) -> ApiResult<TokenResponse> {
    api::session::login_handler(&state, req).await
}

async fn refresh(State(state): State<AppState>, ApiJson(req): ApiJson<RefreshRequest>) -> ApiResult<TokenResponse> {
    api::session::refresh_handler(&state, req).await
}

async fn logout(
    State(state): State<AppState>,
    Extension(user): Auth,
    body: Option<ApiJson<LogoutRequest>>,
) -> ApiResult<MessageResponse> {
    let req = body.map(|ApiJson(req)| req).unwrap_or_default();
    api::session::logout_handler(&state, &user, req).await
}

// ---- users ----

async fn me(State(state): State<AppState>, Extension(user): Auth) -> ApiResult<UserResponse> {
    api::users::me_handler(&state, &user).await
}

async fn list_users(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> ApiResult<Page<UserResponse>> {
    api::users::list_users_handler(&state, &user, query).await
}

async fn update_role(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateRoleRequest>,
) -> ApiResult<UserResponse> {
    api::users::update_role_handler(&state, &user, id, req).await
}

async fn deactivate_user(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<UserResponse> {
    api::users::deactivate_user_handler(&state, &user, id).await
}

// ---- projects ----

async fn create_project(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> Created<ProjectResponse> {
    created(api::projects::create_project_handler(&state, &user, req).await)
}

async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiQuery(query): ApiQuery<ProjectListQuery>,
) -> ApiResult<Page<ProjectResponse>> {
    api::projects::list_projects_handler(&state, &user, query).await
}

async fn get_project(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ProjectResponse> {
    api::projects::get_project_handler(&state, &user, id).await
}

async fn update_project(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateProjectRequest>,
) -> ApiResult<ProjectUpdateResponse> {
    api::projects::update_project_handler(&state, &user, id, req).await
}

async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<MessageResponse> {
    api::projects::delete_project_handler(&state, &user, id).await
}

// ---- members ----

async fn list_members(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Vec<MemberResponse>> {
    api::members::list_members_handler(&state, &user, id).await
}

async fn add_member(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> Created<MemberResponse> {
    created(api::members::add_member_handler(&state, &user, id, req).await)
}

async fn update_member(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath((id, member_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdateMemberRequest>,
) -> ApiResult<MemberResponse> {
    api::members::update_member_handler(&state, &user, id, member_id, req).await
}

async fn remove_member(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath((id, member_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<MessageResponse> {
    api::members::remove_member_handler(&state, &user, id, member_id).await
}

// ---- milestones ----

async fn list_milestones(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Vec<MilestoneResponse>> {
    api::milestones::list_milestones_handler(&state, &user, id).await
}

async fn create_milestone(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateMilestoneRequest>,
) -> Created<MilestoneResponse> {
    created(api::milestones::create_milestone_handler(&state, &user, id, req).await)
}

async fn get_milestone(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<MilestoneResponse> {
    api::milestones::get_milestone_handler(&state, &user, id).await
}

async fn update_milestone(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateMilestoneRequest>,
) -> ApiResult<MilestoneResponse> {
    api::milestones::update_milestone_handler(&state, &user, id, req).await
}

async fn delete_milestone(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<MessageResponse> {
    api::milestones::delete_milestone_handler(&state, &user, id).await
}

// ---- tasks ----

async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> ApiResult<Page<TaskResponse>> {
    api::tasks::list_tasks_handler(&state, &user, id, query).await
}

async fn create_task(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Created<TaskResponse> {
    created(api::tasks::create_task_handler(&state, &user, id, req).await)
}

async fn get_task(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<TaskResponse> {
    api::tasks::get_task_handler(&state, &user, id).await
}

async fn update_task(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<TaskResponse> {
    api::tasks::update_task_handler(&state, &user, id, req).await
}

async fn assign_task(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AssignTaskRequest>,
) -> ApiResult<TaskResponse> {
    api::tasks::assign_task_handler(&state, &user, id, req).await
}

async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<MessageResponse> {
    api::tasks::delete_task_handler(&state, &user, id).await
}

// ---- comments ----

async fn list_comments(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Vec<CommentResponse>> {
    api::comments::list_comments_handler(&state, &user, id).await
}

async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Created<CommentResponse> {
    created(api::comments::create_comment_handler(&state, &user, id, req).await)
}

async fn update_comment(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> ApiResult<CommentResponse> {
    api::comments::update_comment_handler(&state, &user, id, req).await
}

async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<MessageResponse> {
    api::comments::delete_comment_handler(&state, &user, id).await
}

// ---- attachments ----

async fn list_attachments(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Vec<AttachmentResponse>> {
    api::attachments::list_attachments_handler(&state, &user, id).await
}

async fn upload_attachment(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<UploadQuery>,
    headers: HeaderMap,
    ApiBytes(body): ApiBytes,
) -> Created<AttachmentResponse> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    created(api::attachments::upload_attachment_handler(&state, &user, id, query, content_type, body).await)
}

async fn download_attachment(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Response> {
    api::attachments::download_attachment_handler(&state, &user, id).await
}

async fn delete_attachment(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<MessageResponse> {
    api::attachments::delete_attachment_handler(&state, &user, id).await
}

// ---- time logs ----

async fn list_time_logs(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Vec<TimeLogResponse>> {
    api::time_logs::list_time_logs_handler(&state, &user, id).await
}

async fn create_time_log(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateTimeLogRequest>,
) -> Created<TimeLogResponse> {
    created(api::time_logs::create_time_log_handler(&state, &user, id, req).await)
}

async fn delete_time_log(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<MessageResponse> {
    api::time_logs::delete_time_log_handler(&state, &user, id).await
}

// ---- analytics ----

async fn project_summary(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ProjectSummary> {
    api::analytics::project_summary_handler(&state, &user, id).await
}

async fn project_time(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(range): ApiQuery<DateRangeQuery>,
) -> ApiResult<TimeSeries> {
    api::analytics::project_time_handler(&state, &user, id, range).await
}

async fn my_time(
    State(state): State<AppState>,
    Extension(user): Auth,
    ApiQuery(range): ApiQuery<DateRangeQuery>,
) -> ApiResult<TimeSeries> {
    api::analytics::my_time_handler(&state, &user, range).await
}

/// Creates the API router under `/api/v1`.
pub fn create_router(state: AppState) -> Router {
    // Leave room above the attachment limit so the store reports the
    // overflow instead of a truncated read.
    let upload_limit = usize::try_from(state.attachments.max_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(1);

    let protected_routes = Router::new()
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/users/me", get(me))
        .route("/api/v1/users", get(list_users))
        .route("/api/v1/users/:id/role", put(update_role))
        .route("/api/v1/users/:id/deactivate", post(deactivate_user))
        .route("/api/v1/projects", get(list_projects).post(create_project))
        .route(
            "/api/v1/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/v1/projects/:id/members", get(list_members).post(add_member))
        .route(
            "/api/v1/projects/:id/members/:user_id",
            put(update_member).delete(remove_member),
        )
        .route(
            "/api/v1/projects/:id/milestones",
            get(list_milestones).post(create_milestone),
        )
        .route("/api/v1/projects/:id/tasks", get(list_tasks).post(create_task))
        .route("/api/v1/projects/:id/analytics/summary", get(project_summary))
        .route("/api/v1/projects/:id/analytics/time", get(project_time))
        .route(
            "/api/v1/milestones/:id",
            get(get_milestone)
                .put(update_milestone)
                .delete(delete_milestone),
        )
        .route(
            "/api/v1/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/v1/tasks/:id/assignee", put(assign_task))
        .route("/api/v1/tasks/:id/comments", get(list_comments).post(create_comment))
        .route(
            "/api/v1/tasks/:id/attachments",
            get(list_attachments).post(upload_attachment.layer(DefaultBodyLimit::max(upload_limit))),
        )
        .route(
            "/api/v1/tasks/:id/time-logs",
            get(list_time_logs).post(create_time_log),
        )
        .route(
            "/api/v1/comments/:id",
            put(update_comment).delete(delete_comment),
        )
        .route(
            "/api/v1/attachments/:id",
            get(download_attachment).delete(delete_attachment),
        )
        .route("/api/v1/time-logs/:id", axum::routing::delete(delete_time_log))
        .route("/api/v1/analytics/me", get(my_time))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let public_routes = Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh", post(refresh));

    public_routes.merge(protected_routes).with_state(state)
}

#[derive(Debug, Serialize)]
struct Health {
    status:         &'static str,
    uptime_seconds: u64,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status:         "ok",
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Creates the health check router
pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

/// Creates the main application router with tracing and request ids.
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .merge(create_health_router(state.clone()))
        .merge(create_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}
