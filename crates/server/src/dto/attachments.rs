//! # Attachment Data Transfer Objects

use chrono::{DateTime, Utc};
use entity::attachments;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Query of an upload; the body is the raw file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UploadQuery {
    #[validate(length(min = 1, max = 255, message = "File name must be between 1 and 255 characters"))]
    pub file_name: String,
}

impl UploadQuery {
    /// Base name only; directory components a client sends are dropped.
    pub fn sanitized_file_name(&self) -> String {
        self.file_name
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentResponse {
    pub id:           Uuid,
    pub task_id:      Uuid,
    pub uploaded_by:  Uuid,
    pub file_name:    String,
    pub content_type: String,
    pub size_bytes:   i64,
    pub created_at:   DateTime<Utc>,
}

impl From<attachments::Model> for AttachmentResponse {
    fn from(a: attachments::Model) -> Self {
        Self {
            id:           a.id,
            task_id:      a.task_id,
            uploaded_by:  a.uploaded_by,
            file_name:    a.file_name,
            content_type: a.content_type,
            size_bytes:   a.size_bytes,
            created_at:   a.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_file_name() {
        let q = |name: &str| {
            UploadQuery {
                file_name: name.to_string(),
            }
        };
        assert_eq!(q("report.pdf").sanitized_file_name(), "report.pdf");
        assert_eq!(q("../../etc/passwd").sanitized_file_name(), "passwd");
        assert_eq!(q("C:\\Users\\me\\notes.txt").sanitized_file_name(), "notes.txt");
        assert_eq!(q("dir/").sanitized_file_name(), "");
    }
}
