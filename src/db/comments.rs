// Comment repository operations

use tokio_postgres::{Client, Row};
use tracing::info;
use uuid::Uuid;

use super::{parse_id, require_caller, Database};
use crate::error::ApiError;
use crate::models::{Comment, CommentRequest};

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.author_id, a.username, c.content, c.created_at, c.updated_at
    FROM comments c
    JOIN profiles a ON a.id = c.author_id
"#;

fn comment_from_row(row: &Row) -> Comment {
    Comment {
        id: row.get(0),
        post_id: row.get(1),
        author_id: row.get(2),
        author_username: row.get(3),
        content: row.get(4),
        created_at: row.get(5),
        updated_at: row.get(6),
    }
}

impl Database {
    async fn require_comment(client: &Client, comment_id: Uuid) -> Result<Comment, ApiError> {
        let query = format!("{} WHERE c.id = $1", COMMENT_SELECT);
        let row = client.query_opt(&query, &[&comment_id]).await?;

        row.as_ref()
            .map(comment_from_row)
            .ok_or_else(|| ApiError::NotFound(format!("Comment with id {} not found", comment_id)))
    }

    pub async fn create_comment(
        &self,
        author_id: Uuid,
        post_id: &str,
        request: CommentRequest,
    ) -> Result<Comment, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let post_uuid = parse_id(post_id, "post")?;
        let client = self.get_connection().await?;
        require_caller(&**client, author_id).await?;
        Self::require_post(&client, post_uuid).await?;

        let query = r#"
            INSERT INTO comments (id, post_id, author_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        "#;
        let row = client
            .query_one(
                query,
                &[&Uuid::new_v4(), &post_uuid, &author_id, &request.get_normalized_content()],
            )
            .await?;

        let created = Self::require_comment(&client, row.get(0)).await?;
        info!("Created comment {} on post {}", created.id, post_uuid);
        Ok(created)
    }

    /// ポストに付いたコメントを古い順に返す。ポストが無ければ 404。
    pub async fn get_comments_for_post(&self, post_id: &str) -> Result<Vec<Comment>, ApiError> {
        let post_uuid = parse_id(post_id, "post")?;
        let client = self.get_connection().await?;
        Self::require_post(&client, post_uuid).await?;

        let query = format!("{} WHERE c.post_id = $1 ORDER BY c.created_at ASC", COMMENT_SELECT);
        let rows = client.query(&query, &[&post_uuid]).await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    pub async fn get_comment_by_id(&self, comment_id: &str) -> Result<Comment, ApiError> {
        let uuid = parse_id(comment_id, "comment")?;
        let client = self.get_connection().await?;

        Self::require_comment(&client, uuid).await
    }

    /// 本文の書き換えは作者本人のみ。
    pub async fn update_comment(
        &self,
        author_id: Uuid,
        comment_id: &str,
        request: CommentRequest,
    ) -> Result<Comment, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let uuid = parse_id(comment_id, "comment")?;
        let client = self.get_connection().await?;

        let existing = Self::require_comment(&client, uuid).await?;
        if existing.author_id != author_id {
            return Err(ApiError::forbidden("You do not have permission to edit this comment"));
        }

        client
            .execute(
                "UPDATE comments SET content = $1, updated_at = NOW() WHERE id = $2",
                &[&request.get_normalized_content(), &uuid],
            )
            .await?;

        info!("Updated comment with id: {}", uuid);
        Self::require_comment(&client, uuid).await
    }

    /// 作者本人、またはモデレーター (`is_staff`) が削除できる。
    pub async fn delete_comment(
        &self,
        caller_profile_id: Uuid,
        caller_is_staff: bool,
        comment_id: &str,
    ) -> Result<(), ApiError> {
        let uuid = parse_id(comment_id, "comment")?;
        let client = self.get_connection().await?;

        let existing = Self::require_comment(&client, uuid).await?;
        if existing.author_id != caller_profile_id && !caller_is_staff {
            return Err(ApiError::forbidden("You do not have permission to delete this comment"));
        }

        let rows_affected = client.execute("DELETE FROM comments WHERE id = $1", &[&uuid]).await?;
        if rows_affected == 0 {
            Err(ApiError::NotFound(format!("Comment with id {} not found", comment_id)))
        } else {
            info!(
                "Deleted comment {} (moderated: {})",
                uuid,
                existing.author_id != caller_profile_id
            );
            Ok(())
        }
    }
}
