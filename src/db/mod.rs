use crate::error::ApiError;
use crate::config::DatabaseConfig;
use deadpool_postgres::{Config, Pool, Runtime, Object};
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::GenericClient;
use native_tls::TlsConnector;
use tracing::{error, info, warn};
use uuid::Uuid;

mod accounts;
mod comments;
mod follows;
mod likes;
mod posts;
mod profiles;

/// PostgreSQL への接続プールを握るリポジトリ層。
/// Deadpool の `Pool` を内部に保持し、各種ドメイン操作をメソッドとして提供する。
/// メソッドはテーブルごとにサブモジュールへ分割している。
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

/// 起動時に流す DDL。`IF NOT EXISTS` なので何度実行しても安全。
const MIGRATIONS: &[(&str, &str)] = &[
    ("uuid extension", "CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\""),
    (
        "users table",
        r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
                email VARCHAR(255) UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                is_staff BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
    ),
    (
        "profiles table",
        r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
                user_id UUID UNIQUE NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                username VARCHAR(50) UNIQUE NOT NULL,
                first_name VARCHAR(50) NOT NULL,
                last_name VARCHAR(50) NOT NULL,
                bio TEXT NOT NULL DEFAULT '',
                avatar_url VARCHAR(500),
                date_of_birth DATE,
                location VARCHAR(255) NOT NULL DEFAULT '',
                phone VARCHAR(20) NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
    ),
    (
        "follows table",
        r#"
            CREATE TABLE IF NOT EXISTS follows (
                follower_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                following_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (follower_id, following_id),
                CONSTRAINT follows_no_self_follow CHECK (follower_id <> following_id)
            )
        "#,
    ),
    (
        "follows following_id index",
        "CREATE INDEX IF NOT EXISTS idx_follows_following_id ON follows(following_id)",
    ),
    (
        "posts table",
        r#"
            CREATE TABLE IF NOT EXISTS posts (
                id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
                author_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                media_url VARCHAR(500),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
    ),
    (
        "posts author_id index",
        "CREATE INDEX IF NOT EXISTS idx_posts_author_id ON posts(author_id)",
    ),
    (
        "posts created_at index",
        "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at DESC)",
    ),
    (
        "likes table",
        r#"
            CREATE TABLE IF NOT EXISTS likes (
                user_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (user_id, post_id)
            )
        "#,
    ),
    (
        "likes post_id index",
        "CREATE INDEX IF NOT EXISTS idx_likes_post_id ON likes(post_id)",
    ),
    (
        "comments table",
        r#"
            CREATE TABLE IF NOT EXISTS comments (
                id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
                post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                author_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
    ),
    (
        "comments post_id index",
        "CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id, created_at)",
    ),
];

impl Database {
    /// 接続プールを構築し、起動時に疎通確認まで実施する。
    /// `async fn` なので `Database::new(config).await` のように `await` が必要。
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Creating PostgreSQL connection pool for host: {}:{}", config.host, config.port);

        let db = Self::connect_lazy(config)?;
        db.test_connection().await?;

        Ok(db)
    }

    /// プールだけ作り、実際の接続は最初のクエリまで遅延させる。
    /// DB なしで起動できるので、ルーターのテストでも使っている。
    pub fn connect_lazy(config: DatabaseConfig) -> Result<Self, ApiError> {
        let pool = Self::create_pool(config)?;
        Ok(Database { pool })
    }

    /// Deadpool 用の `Config` を組み立ててプールを生成する内部関数。
    /// `match` で SSL モードを切り替え、`native_tls` で TLS コネクタを差し込んでいる。
    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);
        pg_config.connect_timeout = Some(config.connection_timeout);

        pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
            "disable" => deadpool_postgres::SslMode::Disable,
            "prefer" => deadpool_postgres::SslMode::Prefer,
            "require" => deadpool_postgres::SslMode::Require,
            other => {
                warn!("Unknown SSL mode '{}', defaulting to 'require'", other);
                deadpool_postgres::SslMode::Require
            }
        });

        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        let mut pool_config = deadpool_postgres::PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pool_config.timeouts.create = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        let tls_connector = TlsConnector::builder()
            .build()
            .map_err(|e| {
                error!("Failed to create TLS connector: {}", e);
                ApiError::Database(format!("TLS connector creation failed: {}", e))
            })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                ApiError::Database(format!("Connection pool creation failed: {}", e))
            })
    }

    /// プールから接続を借りる小さなラッパー。
    /// `deadpool_postgres::Pool::get` が返す `PoolError` を `ApiError` に変換する。
    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// `SELECT 1` を投げて DB が生きているか確認する。readiness エンドポイントから呼ばれる。
    pub async fn health_check(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database health check failed: {}", e);
                ApiError::Database(format!("Health check failed: {}", e))
            })?;

        Ok(())
    }

    /// アプリ起動時にテーブル群を CREATE する簡易マイグレーター。
    pub async fn migrate(&self) -> Result<(), ApiError> {
        info!("Running database migrations");

        let client = self.get_connection().await?;

        for (name, statement) in MIGRATIONS {
            client.batch_execute(statement)
                .await
                .map_err(|e| {
                    error!("Failed to apply migration '{}': {}", name, e);
                    ApiError::Database(format!("Migration '{}' failed: {}", name, e))
                })?;
        }

        info!("Database migrations completed successfully ({} statements)", MIGRATIONS.len());
        Ok(())
    }

    /// `Database::new` 直後にプール全体が機能するかの確認に使う。
    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database connection test failed: {}", e);
                ApiError::Database(format!("Connection test failed: {}", e))
            })?;

        info!("Database connection test successful");
        Ok(())
    }
}

/// パスパラメータの UUID 文字列をパースする。失敗時は 400 を返す。
fn parse_id(raw: &str, resource: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::Validation(format!("Invalid {} ID format", resource)))
}

/// 書き込み前に呼び出し元のプロフィールがまだ存在するか確認する。
/// アクセストークンはアカウント削除後も期限まで有効なので、FK 違反になる前に 401 で弾く。
async fn require_caller<C: GenericClient>(client: &C, profile_id: Uuid) -> Result<(), ApiError> {
    let row = client
        .query_opt("SELECT 1 FROM profiles WHERE id = $1", &[&profile_id])
        .await?;

    match row {
        Some(_) => Ok(()),
        None => Err(ApiError::unauthorized("Account no longer exists")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "post").unwrap(), id);

        match parse_id("42", "post") {
            Err(ApiError::Validation(message)) => assert_eq!(message, "Invalid post ID format"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_migrations_create_every_table() {
        for table in ["users", "profiles", "follows", "posts", "likes", "comments"] {
            let create = format!("CREATE TABLE IF NOT EXISTS {} (", table);
            assert!(
                MIGRATIONS.iter().any(|(_, sql)| sql.contains(&create)),
                "missing migration for {}",
                table
            );
        }
    }

    #[test]
    fn test_migrations_enforce_uniqueness() {
        let follows = MIGRATIONS.iter().find(|(name, _)| *name == "follows table").unwrap().1;
        assert!(follows.contains("PRIMARY KEY (follower_id, following_id)"));
        assert!(follows.contains("CHECK (follower_id <> following_id)"));

        let likes = MIGRATIONS.iter().find(|(name, _)| *name == "likes table").unwrap().1;
        assert!(likes.contains("PRIMARY KEY (user_id, post_id)"));
    }
}
