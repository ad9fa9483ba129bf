use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::validation::{normalize_optional, optional_url, require_text};

pub const MAX_POST_LENGTH: usize = 5000;

/// Post entity as returned by the API, with author and engagement counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub content: String,
    pub media_url: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request structure for creating a new post; the author is the caller
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub content: String,
    pub media_url: Option<String>,
}

/// Partial post update. An empty `media_url` removes the attachment.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub content: Option<String>,
    pub media_url: Option<String>,
}

/// Query parameters for listing posts
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListPostsQuery {
    /// Only posts written by this profile
    pub author_id: Option<String>,
    /// Case-insensitive substring match on the post text
    pub search: Option<String>,
}

impl CreatePostRequest {
    /// Validate the create post request
    pub fn validate(&self) -> Result<(), String> {
        require_text("Content", &self.content, MAX_POST_LENGTH)?;
        optional_url("Media URL", self.media_url.as_deref())?;
        Ok(())
    }

    /// Get normalized content (trimmed)
    pub fn get_normalized_content(&self) -> String {
        self.content.trim().to_string()
    }

    /// Get normalized media reference (trimmed, None if empty)
    pub fn get_normalized_media_url(&self) -> Option<String> {
        normalize_optional(self.media_url.as_ref())
    }
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.content.is_none() && self.media_url.is_none() {
            return Err("At least one field (content or media_url) must be provided for update".to_string());
        }

        if let Some(ref content) = self.content {
            require_text("Content", content, MAX_POST_LENGTH)?;
        }

        optional_url("Media URL", self.media_url.as_deref())?;
        Ok(())
    }

    pub fn get_normalized_content(&self) -> Option<String> {
        self.content.as_ref().map(|c| c.trim().to_string())
    }

    /// `None` = leave untouched, `Some(None)` = clear, `Some(Some(url))` = replace
    pub fn get_normalized_media_url(&self) -> Option<Option<String>> {
        self.media_url
            .as_ref()
            .map(|url| Some(url.trim().to_string()).filter(|u| !u.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_request_validation() {
        // Valid request with media
        let valid_request = CreatePostRequest {
            content: "Hello world".to_string(),
            media_url: Some("https://cdn.example.com/p.jpg".to_string()),
        };
        assert!(valid_request.validate().is_ok());

        // Valid request without media
        let no_media = CreatePostRequest {
            content: "Hello world".to_string(),
            media_url: None,
        };
        assert!(no_media.validate().is_ok());

        // Whitespace-only content
        let blank = CreatePostRequest {
            content: "   ".to_string(),
            media_url: None,
        };
        assert!(blank.validate().is_err());

        // Content too long
        let long_content = CreatePostRequest {
            content: "a".repeat(MAX_POST_LENGTH + 1),
            media_url: None,
        };
        assert!(long_content.validate().is_err());

        // Media reference that is not a URL
        let bad_media = CreatePostRequest {
            content: "Hello".to_string(),
            media_url: Some("/etc/passwd".to_string()),
        };
        assert!(bad_media.validate().is_err());
    }

    #[test]
    fn test_create_post_request_normalization() {
        let request = CreatePostRequest {
            content: "  Hello world  ".to_string(),
            media_url: Some("   ".to_string()), // Only whitespace
        };

        assert_eq!(request.get_normalized_content(), "Hello world");
        assert_eq!(request.get_normalized_media_url(), None);
    }

    #[test]
    fn test_update_post_request() {
        assert!(UpdatePostRequest::default().validate().is_err());

        let clear_media = UpdatePostRequest {
            content: None,
            media_url: Some(String::new()),
        };
        assert!(clear_media.validate().is_ok());
        assert_eq!(clear_media.get_normalized_media_url(), Some(None));
        assert_eq!(clear_media.get_normalized_content(), None);

        let untouched = UpdatePostRequest {
            content: Some(" edited ".to_string()),
            media_url: None,
        };
        assert_eq!(untouched.get_normalized_media_url(), None);
        assert_eq!(untouched.get_normalized_content(), Some("edited".to_string()));
    }

    #[test]
    fn test_post_serialization() {
        let post = Post {
            id: Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap(),
            author_id: Uuid::parse_str("987fcdeb-51a2-43d1-9f12-345678901234").unwrap(),
            author_username: "dicaprio".to_string(),
            content: "This is test content".to_string(),
            media_url: None,
            likes_count: 2,
            comments_count: 1,
            created_at: DateTime::parse_from_rfc3339("2022-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339("2022-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
        };

        // Test serialization to JSON with null media
        let json = serde_json::to_string(&post).expect("Failed to serialize post");
        let expected = r#"{"id":"123e4567-e89b-12d3-a456-426614174000","author_id":"987fcdeb-51a2-43d1-9f12-345678901234","author_username":"dicaprio","content":"This is test content","media_url":null,"likes_count":2,"comments_count":1,"created_at":"2022-01-01T00:00:00Z","updated_at":"2022-01-01T00:00:00Z"}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_create_post_request_deserialization() {
        let json_with_media = r#"{"content":"Test content","media_url":"https://cdn.example.com/p.jpg"}"#;
        let request: CreatePostRequest = serde_json::from_str(json_with_media).expect("Failed to deserialize CreatePostRequest");
        assert_eq!(request.content, "Test content");
        assert_eq!(request.media_url, Some("https://cdn.example.com/p.jpg".to_string()));

        let json_without_media = r#"{"content":"Test content"}"#;
        let request: CreatePostRequest = serde_json::from_str(json_without_media).expect("Failed to deserialize CreatePostRequest");
        assert_eq!(request.media_url, None);
    }
}
