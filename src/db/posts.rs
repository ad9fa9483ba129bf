// Post repository operations

use tokio_postgres::{types::ToSql, Client, Row};
use tracing::info;
use uuid::Uuid;

use super::{parse_id, require_caller, Database};
use crate::error::ApiError;
use crate::models::validation::{like_pattern, normalize_optional};
use crate::models::{CreatePostRequest, ListPostsQuery, Post, UpdatePostRequest};

/// 作者名といいね数・コメント数をまとめて引くための共通 SELECT。
pub(super) const POST_SELECT: &str = r#"
    SELECT p.id, p.author_id, a.username, p.content, p.media_url,
           (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes_count,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
           p.created_at, p.updated_at
    FROM posts p
    JOIN profiles a ON a.id = p.author_id
"#;

pub(super) fn post_from_row(row: &Row) -> Post {
    Post {
        id: row.get(0),
        author_id: row.get(1),
        author_username: row.get(2),
        content: row.get(3),
        media_url: row.get(4),
        likes_count: row.get(5),
        comments_count: row.get(6),
        created_at: row.get(7),
        updated_at: row.get(8),
    }
}

impl Database {
    pub(super) async fn fetch_post(client: &Client, post_id: Uuid) -> Result<Option<Post>, ApiError> {
        let query = format!("{} WHERE p.id = $1", POST_SELECT);
        let row = client.query_opt(&query, &[&post_id]).await?;
        Ok(row.as_ref().map(post_from_row))
    }

    pub(super) async fn require_post(client: &Client, post_id: Uuid) -> Result<Post, ApiError> {
        Self::fetch_post(client, post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Post with id {} not found", post_id)))
    }

    /// ポスト作成ロジック。作者は常に呼び出し元のプロフィール。
    pub async fn create_post(&self, author_id: Uuid, request: CreatePostRequest) -> Result<Post, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let content = request.get_normalized_content();
        let media_url = request.get_normalized_media_url();
        let client = self.get_connection().await?;
        require_caller(&**client, author_id).await?;

        let query = r#"
            INSERT INTO posts (id, author_id, content, media_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        "#;
        let row = client
            .query_one(query, &[&Uuid::new_v4(), &author_id, &content, &media_url])
            .await?;

        let created = Self::require_post(&client, row.get(0)).await?;
        info!("Created post with id: {}", created.id);
        Ok(created)
    }

    pub async fn get_post_by_id(&self, post_id: &str) -> Result<Post, ApiError> {
        let uuid = parse_id(post_id, "post")?;
        let client = self.get_connection().await?;

        Self::require_post(&client, uuid).await
    }

    /// 作者 ID と本文検索で絞り込めるポスト一覧 (新しい順)。
    /// 条件の有無に応じて WHERE 句とプレースホルダ番号を組み立てる。
    pub async fn get_all_posts(&self, filter: &ListPostsQuery) -> Result<Vec<Post>, ApiError> {
        let author_id = filter
            .author_id
            .as_deref()
            .map(|id| parse_id(id, "author"))
            .transpose()?;
        let pattern = normalize_optional(filter.search.as_ref()).map(|term| like_pattern(&term));

        let mut conditions = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(ref author_id) = author_id {
            params.push(author_id);
            conditions.push(format!("p.author_id = ${}", params.len()));
        }

        if let Some(ref pattern) = pattern {
            params.push(pattern);
            conditions.push(format!("p.content ILIKE ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let query = format!("{} {} ORDER BY p.created_at DESC", POST_SELECT, where_clause);

        let client = self.get_connection().await?;
        let rows = client.query(&query, &params).await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    /// フォロー中のプロフィールが書いたポストだけを新しい順に返す。
    pub async fn get_feed(&self, profile_id: Uuid) -> Result<Vec<Post>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!(
            "{} JOIN follows f ON f.following_id = p.author_id WHERE f.follower_id = $1 ORDER BY p.created_at DESC",
            POST_SELECT
        );

        let rows = client.query(&query, &[&profile_id]).await?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    /// 作者本人のみ更新可能。`media_url` は空文字で削除できる。
    pub async fn update_post(
        &self,
        author_id: Uuid,
        post_id: &str,
        request: UpdatePostRequest,
    ) -> Result<Post, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let uuid = parse_id(post_id, "post")?;
        let client = self.get_connection().await?;

        let existing = Self::require_post(&client, uuid).await?;
        if existing.author_id != author_id {
            return Err(ApiError::forbidden("You do not have permission to edit this post"));
        }

        let content = request.get_normalized_content();
        let media_url = request.get_normalized_media_url();
        let updated_at = chrono::Utc::now();

        let mut assignments = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(ref content) = content {
            params.push(content);
            assignments.push(format!("content = ${}", params.len()));
        }

        if let Some(ref media_url) = media_url {
            params.push(media_url);
            assignments.push(format!("media_url = ${}", params.len()));
        }

        params.push(&updated_at);
        assignments.push(format!("updated_at = ${}", params.len()));

        params.push(&uuid);
        let query = format!(
            "UPDATE posts SET {} WHERE id = ${}",
            assignments.join(", "),
            params.len()
        );
        client.execute(&query, &params).await?;

        info!("Updated post with id: {}", uuid);
        Self::require_post(&client, uuid).await
    }

    /// 作者本人のみ削除可能。いいね・コメントは CASCADE で消える。
    pub async fn delete_post(&self, author_id: Uuid, post_id: &str) -> Result<(), ApiError> {
        let uuid = parse_id(post_id, "post")?;
        let client = self.get_connection().await?;

        let existing = Self::require_post(&client, uuid).await?;
        if existing.author_id != author_id {
            return Err(ApiError::forbidden("You do not have permission to delete this post"));
        }

        let rows_affected = client.execute("DELETE FROM posts WHERE id = $1", &[&uuid]).await?;
        if rows_affected == 0 {
            Err(ApiError::NotFound(format!("Post with id {} not found", post_id)))
        } else {
            info!("Deleted post with id: {}", uuid);
            Ok(())
        }
    }
}
