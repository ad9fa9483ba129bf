// Like repository operations

use tokio_postgres::GenericClient;
use tracing::info;
use uuid::Uuid;

use super::posts::{post_from_row, POST_SELECT};
use super::{parse_id, require_caller, Database};
use crate::error::ApiError;
use crate::models::{LikeStatus, Post};

async fn likes_count<C: GenericClient>(client: &C, post_id: Uuid) -> Result<i64, ApiError> {
    let row = client
        .query_one("SELECT COUNT(*) FROM likes WHERE post_id = $1", &[&post_id])
        .await?;
    Ok(row.get(0))
}

async fn ensure_post_exists<C: GenericClient>(client: &C, post_id: Uuid) -> Result<(), ApiError> {
    let row = client
        .query_opt("SELECT 1 FROM posts WHERE id = $1", &[&post_id])
        .await?;

    match row {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound(format!("Post with id {} not found", post_id))),
    }
}

impl Database {
    /// いいねを付ける。主キー (user_id, post_id) と `ON CONFLICT DO NOTHING` により、
    /// 何度呼んでもレコードは 1 件のまま。
    pub async fn like_post(&self, profile_id: Uuid, post_id: &str) -> Result<LikeStatus, ApiError> {
        let uuid = parse_id(post_id, "post")?;
        let client = self.get_connection().await?;
        require_caller(&**client, profile_id).await?;
        ensure_post_exists(&**client, uuid).await?;

        let inserted = client
            .execute(
                "INSERT INTO likes (user_id, post_id) VALUES ($1, $2) ON CONFLICT (user_id, post_id) DO NOTHING",
                &[&profile_id, &uuid],
            )
            .await?;
        if inserted == 1 {
            info!("Profile {} liked post {}", profile_id, uuid);
        }

        Ok(LikeStatus {
            post_id: uuid,
            liked: true,
            likes_count: likes_count(&**client, uuid).await?,
        })
    }

    /// いいねを外す。付いていなくても成功扱い。
    pub async fn unlike_post(&self, profile_id: Uuid, post_id: &str) -> Result<LikeStatus, ApiError> {
        let uuid = parse_id(post_id, "post")?;
        let client = self.get_connection().await?;
        ensure_post_exists(&**client, uuid).await?;

        let deleted = client
            .execute(
                "DELETE FROM likes WHERE user_id = $1 AND post_id = $2",
                &[&profile_id, &uuid],
            )
            .await?;
        if deleted == 1 {
            info!("Profile {} unliked post {}", profile_id, uuid);
        }

        Ok(LikeStatus {
            post_id: uuid,
            liked: false,
            likes_count: likes_count(&**client, uuid).await?,
        })
    }

    /// いいねの有無を反転させる。DELETE が 0 件なら INSERT する、をトランザクション内で行う。
    pub async fn toggle_like(&self, profile_id: Uuid, post_id: &str) -> Result<LikeStatus, ApiError> {
        let uuid = parse_id(post_id, "post")?;
        let mut client = self.get_connection().await?;
        let transaction = client.transaction().await?;
        require_caller(&*transaction, profile_id).await?;
        ensure_post_exists(&*transaction, uuid).await?;

        let deleted = transaction
            .execute(
                "DELETE FROM likes WHERE user_id = $1 AND post_id = $2",
                &[&profile_id, &uuid],
            )
            .await?;

        let liked = if deleted == 0 {
            transaction
                .execute(
                    "INSERT INTO likes (user_id, post_id) VALUES ($1, $2) ON CONFLICT (user_id, post_id) DO NOTHING",
                    &[&profile_id, &uuid],
                )
                .await?;
            true
        } else {
            false
        };

        let count = likes_count(&*transaction, uuid).await?;
        transaction.commit().await?;

        info!("Profile {} toggled like on post {} (liked: {})", profile_id, uuid, liked);
        Ok(LikeStatus {
            post_id: uuid,
            liked,
            likes_count: count,
        })
    }

    /// 呼び出し元がいいねしたポストを、いいねした順 (新しい順) に返す。
    pub async fn get_liked_posts(&self, profile_id: Uuid) -> Result<Vec<Post>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!(
            "{} JOIN likes lk ON lk.post_id = p.id WHERE lk.user_id = $1 ORDER BY lk.created_at DESC",
            POST_SELECT
        );

        let rows = client.query(&query, &[&profile_id]).await?;
        Ok(rows.iter().map(post_from_row).collect())
    }
}
