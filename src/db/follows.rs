// Follow graph repository operations

use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

use super::{parse_id, require_caller, Database};
use crate::error::ApiError;
use crate::models::{FollowEntry, FollowOutcome, Profile};

fn follow_entry_from_row(row: &Row) -> FollowEntry {
    let first_name: String = row.get(2);
    let last_name: String = row.get(3);

    FollowEntry {
        id: row.get(0),
        username: row.get(1),
        full_name: format!("{} {}", first_name, last_name),
        avatar_url: row.get(4),
        followed_at: row.get(5),
    }
}

impl Database {
    /// `follower` が `target_id` をフォローする。
    /// 既にフォロー済みでもエラーにはせず `AlreadyFollowing` を返す (冪等)。
    pub async fn follow_profile(
        &self,
        follower_id: Uuid,
        target_id: &str,
    ) -> Result<(FollowOutcome, Profile), ApiError> {
        let target = parse_id(target_id, "profile")?;
        if target == follower_id {
            return Err(ApiError::validation("You cannot follow yourself."));
        }

        let client = self.get_connection().await?;
        require_caller(&**client, follower_id).await?;
        let target_profile = Self::require_profile(&client, target).await?;

        let inserted = client
            .execute(
                r#"
                    INSERT INTO follows (follower_id, following_id)
                    VALUES ($1, $2)
                    ON CONFLICT (follower_id, following_id) DO NOTHING
                "#,
                &[&follower_id, &target],
            )
            .await?;

        let outcome = if inserted == 1 {
            info!("Profile {} now follows {}", follower_id, target);
            FollowOutcome::Followed
        } else {
            FollowOutcome::AlreadyFollowing
        };

        Ok((outcome, target_profile))
    }

    pub async fn unfollow_profile(
        &self,
        follower_id: Uuid,
        target_id: &str,
    ) -> Result<(FollowOutcome, Profile), ApiError> {
        let target = parse_id(target_id, "profile")?;
        if target == follower_id {
            return Err(ApiError::validation("You cannot unfollow yourself."));
        }

        let client = self.get_connection().await?;
        let target_profile = Self::require_profile(&client, target).await?;

        let deleted = client
            .execute(
                "DELETE FROM follows WHERE follower_id = $1 AND following_id = $2",
                &[&follower_id, &target],
            )
            .await?;

        let outcome = if deleted == 1 {
            info!("Profile {} unfollowed {}", follower_id, target);
            FollowOutcome::Unfollowed
        } else {
            FollowOutcome::NotFollowing
        };

        Ok((outcome, target_profile))
    }

    /// `profile_id` をフォローしているプロフィール一覧 (新しい順)。
    pub async fn get_followers(&self, profile_id: &str) -> Result<Vec<FollowEntry>, ApiError> {
        let uuid = parse_id(profile_id, "profile")?;
        let client = self.get_connection().await?;
        Self::require_profile(&client, uuid).await?;

        let query = r#"
            SELECT p.id, p.username, p.first_name, p.last_name, p.avatar_url, f.created_at
            FROM follows f
            JOIN profiles p ON p.id = f.follower_id
            WHERE f.following_id = $1
            ORDER BY f.created_at DESC
        "#;
        let rows = client.query(query, &[&uuid]).await?;

        Ok(rows.iter().map(follow_entry_from_row).collect())
    }

    /// `profile_id` がフォローしているプロフィール一覧 (新しい順)。
    pub async fn get_following(&self, profile_id: &str) -> Result<Vec<FollowEntry>, ApiError> {
        let uuid = parse_id(profile_id, "profile")?;
        let client = self.get_connection().await?;
        Self::require_profile(&client, uuid).await?;

        let query = r#"
            SELECT p.id, p.username, p.first_name, p.last_name, p.avatar_url, f.created_at
            FROM follows f
            JOIN profiles p ON p.id = f.following_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at DESC
        "#;
        let rows = client.query(query, &[&uuid]).await?;

        Ok(rows.iter().map(follow_entry_from_row).collect())
    }
}
