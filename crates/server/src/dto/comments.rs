//! # Comment Data Transfer Objects

use chrono::{DateTime, Utc};
use entity::comments;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 10000, message = "Comment must be between 1 and 10000 characters"))]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id:         Uuid,
    pub task_id:    Uuid,
    pub author_id:  Uuid,
    pub body:       String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<comments::Model> for CommentResponse {
    fn from(c: comments::Model) -> Self {
        Self {
            id:         c.id,
            task_id:    c.task_id,
            author_id:  c.author_id,
            body:       c.body,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
