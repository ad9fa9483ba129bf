// Library root for the social media API

pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

// Re-export commonly used types
pub use auth::{AuthUser, TokenService};
pub use config::Config;
pub use db::Database;
pub use error::{ApiError, ApiResult};
pub use routes::{create_router, AppState};
