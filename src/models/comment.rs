use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::require_text;

pub const MAX_COMMENT_LENGTH: usize = 2000;

/// 投稿にぶら下がるコメント。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for both creating and editing a comment
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub content: String,
}

impl CommentRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_text("Comment", &self.content, MAX_COMMENT_LENGTH)
    }

    pub fn get_normalized_content(&self) -> String {
        self.content.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_request_validation() {
        let valid = CommentRequest { content: " Nice shot! ".to_string() };
        assert!(valid.validate().is_ok());
        assert_eq!(valid.get_normalized_content(), "Nice shot!");

        let blank = CommentRequest { content: "\n\t ".to_string() };
        assert_eq!(blank.validate().unwrap_err(), "Comment cannot be empty");

        let long = CommentRequest { content: "x".repeat(MAX_COMMENT_LENGTH + 1) };
        assert!(long.validate().is_err());
    }
}
