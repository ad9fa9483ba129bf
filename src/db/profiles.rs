// Profile repository operations

use tokio_postgres::{types::ToSql, Client, Row};
use tracing::info;
use uuid::Uuid;

use super::{parse_id, Database};
use crate::error::ApiError;
use crate::models::validation::{like_pattern, normalize_optional};
use crate::models::{Profile, UpdateProfileRequest};

pub(super) const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.username, u.email, u.created_at, p.avatar_url,
           p.first_name, p.last_name, p.bio, p.date_of_birth, p.location, p.phone,
           (SELECT COUNT(*) FROM follows f WHERE f.following_id = p.id) AS followers_count,
           (SELECT COUNT(*) FROM follows f WHERE f.follower_id = p.id) AS following_count,
           p.updated_at
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

pub(super) fn profile_from_row(row: &Row) -> Profile {
    Profile {
        id: row.get(0),
        user_id: row.get(1),
        username: row.get(2),
        email: row.get(3),
        date_joined: row.get(4),
        avatar_url: row.get(5),
        first_name: row.get(6),
        last_name: row.get(7),
        bio: row.get(8),
        date_of_birth: row.get(9),
        location: row.get(10),
        phone: row.get(11),
        followers_count: row.get(12),
        following_count: row.get(13),
        updated_at: row.get(14),
    }
}

impl Database {
    pub(super) async fn fetch_profile(client: &Client, profile_id: Uuid) -> Result<Option<Profile>, ApiError> {
        let query = format!("{} WHERE p.id = $1", PROFILE_SELECT);
        let row = client.query_opt(&query, &[&profile_id]).await?;
        Ok(row.as_ref().map(profile_from_row))
    }

    /// 存在しなければ 404 を返す版。
    pub(super) async fn require_profile(client: &Client, profile_id: Uuid) -> Result<Profile, ApiError> {
        Self::fetch_profile(client, profile_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Profile with id {} not found", profile_id)))
    }

    pub async fn get_profile_by_id(&self, profile_id: &str) -> Result<Profile, ApiError> {
        let uuid = parse_id(profile_id, "profile")?;
        let client = self.get_connection().await?;

        Self::require_profile(&client, uuid).await
    }

    pub async fn get_profile_by_uuid(&self, profile_id: Uuid) -> Result<Profile, ApiError> {
        let client = self.get_connection().await?;
        Self::require_profile(&client, profile_id).await
    }

    /// ユーザー名の部分一致 (大文字小文字を区別しない) で絞り込めるプロフィール一覧。
    pub async fn get_all_profiles(&self, username_filter: Option<&String>) -> Result<Vec<Profile>, ApiError> {
        let client = self.get_connection().await?;

        let rows = match normalize_optional(username_filter) {
            Some(term) => {
                let query = format!("{} WHERE p.username ILIKE $1 ORDER BY p.username", PROFILE_SELECT);
                client.query(&query, &[&like_pattern(&term)]).await?
            }
            None => {
                let query = format!("{} ORDER BY p.username", PROFILE_SELECT);
                client.query(&query, &[]).await?
            }
        };

        Ok(rows.iter().map(profile_from_row).collect())
    }

    /// 渡された `UpdateProfileRequest` の Option 値に応じて動的に SQL を組み立てる。
    /// 本人以外の更新は 403。
    pub async fn update_profile(
        &self,
        caller_profile_id: Uuid,
        profile_id: &str,
        request: UpdateProfileRequest,
    ) -> Result<Profile, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let uuid = parse_id(profile_id, "profile")?;
        let client = self.get_connection().await?;

        Self::require_profile(&client, uuid).await?;
        if uuid != caller_profile_id {
            return Err(ApiError::forbidden("You do not have permission to edit this profile"));
        }

        let username = request.username.as_ref().map(|v| v.trim().to_string());
        let first_name = request.first_name.as_ref().map(|v| v.trim().to_string());
        let last_name = request.last_name.as_ref().map(|v| v.trim().to_string());
        let bio = request.bio.as_ref().map(|v| v.trim().to_string());
        let location = request.location.as_ref().map(|v| v.trim().to_string());
        let phone = request.phone.as_ref().map(|v| v.trim().to_string());
        // Blank clears the avatar
        let avatar_url = request.avatar_url.as_ref().map(|v| normalize_optional(Some(v)));
        let updated_at = chrono::Utc::now();

        let mut assignments = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        let text_fields = [
            ("username", &username),
            ("first_name", &first_name),
            ("last_name", &last_name),
            ("bio", &bio),
            ("location", &location),
            ("phone", &phone),
        ];
        for (column, value) in text_fields {
            if let Some(value) = value {
                params.push(value);
                assignments.push(format!("{} = ${}", column, params.len()));
            }
        }

        if let Some(ref avatar_url) = avatar_url {
            params.push(avatar_url);
            assignments.push(format!("avatar_url = ${}", params.len()));
        }

        if let Some(ref date_of_birth) = request.date_of_birth {
            params.push(date_of_birth);
            assignments.push(format!("date_of_birth = ${}", params.len()));
        }

        params.push(&updated_at);
        assignments.push(format!("updated_at = ${}", params.len()));

        params.push(&uuid);
        let query = format!(
            "UPDATE profiles SET {} WHERE id = ${}",
            assignments.join(", "),
            params.len()
        );

        let updated = client.execute(&query, &params).await?;
        if updated == 0 {
            return Err(ApiError::NotFound(format!("Profile with id {} not found", profile_id)));
        }

        info!("Updated profile with id: {}", uuid);
        Self::require_profile(&client, uuid).await
    }

    /// プロフィール削除 = アカウント削除。
    /// `ON DELETE CASCADE` によりフォロー・投稿・いいね・コメントも同時に消える。
    pub async fn delete_profile(&self, caller_profile_id: Uuid, profile_id: &str) -> Result<(), ApiError> {
        let uuid = parse_id(profile_id, "profile")?;
        let client = self.get_connection().await?;

        Self::require_profile(&client, uuid).await?;
        if uuid != caller_profile_id {
            return Err(ApiError::forbidden("You do not have permission to delete this profile"));
        }

        let query = "DELETE FROM users u USING profiles p WHERE p.user_id = u.id AND p.id = $1";
        let rows_affected = client.execute(query, &[&uuid]).await?;

        if rows_affected == 0 {
            Err(ApiError::NotFound(format!("Profile with id {} not found", profile_id)))
        } else {
            info!("Deleted account for profile {} (cascade)", uuid);
            Ok(())
        }
    }
}
