// Account repository operations

use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

use super::Database;
use crate::error::ApiError;
use crate::models::{Account, Profile, RegisterRequest};

const ACCOUNT_SELECT: &str = r#"
    SELECT u.id, p.id, u.email, u.password_hash, u.is_staff, u.created_at
    FROM users u
    JOIN profiles p ON p.user_id = u.id
"#;

fn account_from_row(row: &Row) -> Account {
    Account {
        id: row.get(0),
        profile_id: row.get(1),
        email: row.get(2),
        password_hash: row.get(3),
        is_staff: row.get(4),
        created_at: row.get(5),
    }
}

impl Database {
    /// アカウントとプロフィールを 1 トランザクションで作成する。
    /// メール・ユーザー名の重複は UNIQUE 制約違反として 409 に変換される。
    pub async fn create_account(
        &self,
        request: &RegisterRequest,
        password_hash: &str,
    ) -> Result<(Account, Profile), ApiError> {
        let email = request.normalized_email();
        let username = request.username.trim();
        let first_name = request.first_name.trim();
        let last_name = request.last_name.trim();

        let mut client = self.get_connection().await?;
        let transaction = client.transaction().await?;

        let user_row = transaction
            .query_one(
                r#"
                    INSERT INTO users (id, email, password_hash)
                    VALUES ($1, $2, $3)
                    RETURNING id, is_staff, created_at
                "#,
                &[&Uuid::new_v4(), &email, &password_hash],
            )
            .await?;
        let user_id: Uuid = user_row.get(0);

        let profile_row = transaction
            .query_one(
                r#"
                    INSERT INTO profiles (id, user_id, username, first_name, last_name)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                "#,
                &[&Uuid::new_v4(), &user_id, &username, &first_name, &last_name],
            )
            .await?;
        let profile_id: Uuid = profile_row.get(0);

        transaction.commit().await?;

        let account = Account {
            id: user_id,
            profile_id,
            email,
            password_hash: password_hash.to_string(),
            is_staff: user_row.get(1),
            created_at: user_row.get(2),
        };
        let profile = Self::fetch_profile(&client, profile_id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Profile vanished after registration")))?;

        info!("Registered account {} with profile {}", account.id, profile.id);
        Ok((account, profile))
    }

    /// ログイン用。存在しない場合は `Ok(None)` を返し、呼び出し側で 401 にする。
    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("{} WHERE u.email = $1", ACCOUNT_SELECT);

        let row = client.query_opt(&query, &[&email]).await?;
        Ok(row.as_ref().map(account_from_row))
    }

    /// リフレッシュ時に、トークンの持ち主がまだ存在するか確かめるために使う。
    pub async fn find_account_by_id(&self, user_id: Uuid) -> Result<Option<Account>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("{} WHERE u.id = $1", ACCOUNT_SELECT);

        let row = client.query_opt(&query, &[&user_id]).await?;
        Ok(row.as_ref().map(account_from_row))
    }
}
