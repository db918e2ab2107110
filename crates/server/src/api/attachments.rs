//! # Attachment Handlers
//!
//! Uploads take the raw file as the request body. The row is written after
//! the file; a failed insert removes the file again.

use axum::{
    body::Bytes,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use entity::attachments;
use error::{AppError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{load_attachment, load_task, ok, ApiResult};
use crate::{
    dto::{
        attachments::{AttachmentResponse, UploadQuery},
        MessageResponse,
    },
    middleware::AuthenticatedUser,
    AppState,
};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub async fn list_attachments_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
) -> ApiResult<Vec<AttachmentResponse>> {
    let task = load_task(&state.db, task_id).await?;
    state
        .gate()
        .ensure_can_view(&user.principal, task.project_id)
        .await?;
    let items = attachments::Entity::find()
        .filter(attachments::Column::TaskId.eq(task_id))
        .order_by_asc(attachments::Column::CreatedAt)
        .all(&state.db)
        .await?;
    ok(items.into_iter().map(AttachmentResponse::from).collect())
}

pub async fn upload_attachment_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
    query: UploadQuery,
    content_type: Option<String>,
    body: Bytes,
) -> ApiResult<AttachmentResponse> {
    let task = load_task(&state.db, task_id).await?;
    state
        .gate()
        .ensure_can_modify_resource(&user.principal, task.project_id)
        .await?;
    query.validate()?;
    let file_name = query.sanitized_file_name();
    if file_name.is_empty() {
        return Err(AppError::validation("File name must not be empty"));
    }
    let content_type = content_type
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let storage_key = state.attachments.put(&body).await?;
    let inserted = attachments::ActiveModel {
        id: Set(Uuid::new_v4()),
        task_id: Set(task_id),
        uploaded_by: Set(user.principal.id),
        file_name: Set(file_name),
        content_type: Set(content_type),
        size_bytes: Set(body.len() as i64),
        storage_key: Set(storage_key.clone()),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await;
    let attachment = match inserted {
        Ok(attachment) => attachment,
        Err(e) => {
            if let Err(cleanup) = state.attachments.remove(&storage_key).await {
                warn!(storage_key = %storage_key, error = %cleanup, "Failed to remove orphaned attachment file");
            }
            return Err(e.into());
        },
    };

    info!(
        task_id = %task_id,
        attachment_id = %attachment.id,
        size = attachment.size_bytes,
        "Attachment uploaded"
    );
    ok(attachment.into())
}

/// `Content-Disposition` value for a stored file name.
fn content_disposition(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| if c == '"' || c == '\\' || !c.is_ascii() || c.is_ascii_control() { '_' } else { c })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

pub async fn download_attachment_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    attachment_id: Uuid,
) -> Result<Response> {
    let attachment = load_attachment(&state.db, attachment_id).await?;
    let task = load_task(&state.db, attachment.task_id).await?;
    state
        .gate()
        .ensure_can_view(&user.principal, task.project_id)
        .await?;

    let bytes = state.attachments.get(&attachment.storage_key).await?;
    let content_type = HeaderValue::from_str(&attachment.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, content_disposition(&attachment.file_name)),
        ],
        bytes,
    )
        .into_response())
}

pub async fn delete_attachment_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    attachment_id: Uuid,
) -> ApiResult<MessageResponse> {
    let attachment = load_attachment(&state.db, attachment_id).await?;
    let task = load_task(&state.db, attachment.task_id).await?;
    state
        .gate()
        .ensure_can_delete_resource(&user.principal, task.project_id, attachment.uploaded_by)
        .await?;

    attachments::Entity::delete_by_id(attachment_id)
        .exec(&state.db)
        .await?;
    state.attachments.remove_all(&[attachment.storage_key]).await;

    info!(attachment_id = %attachment_id, user_id = %user.principal.id, "Attachment deleted");
    ok(MessageResponse::new("Attachment deleted"))
}
