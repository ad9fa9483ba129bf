// Router assembly

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{
    auth::TokenService,
    db::Database,
    docs,
    handlers::{
        auth, comments, health_check, posts, profiles, readiness_check,
    },
    middleware::create_middleware_stack,
};

/// Shared state; handlers pull out the piece they need via `State<Arc<_>>`
#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: Database, tokens: TokenService) -> Self {
        Self {
            db: Arc::new(db),
            tokens: Arc::new(tokens),
        }
    }
}

/// Create the Axum router with all endpoints and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        // Authentication
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/me", get(auth::me))
        // Profiles and follows
        .route("/api/profiles", get(profiles::get_all_profiles))
        .route(
            "/api/profiles/:id",
            get(profiles::get_profile_by_id)
                .put(profiles::update_profile)
                .patch(profiles::update_profile)
                .delete(profiles::delete_profile),
        )
        .route("/api/profiles/:id/follow", post(profiles::follow_profile))
        .route("/api/profiles/:id/unfollow", post(profiles::unfollow_profile))
        .route("/api/profiles/:id/followers", get(profiles::get_followers))
        .route("/api/profiles/:id/following", get(profiles::get_following))
        // Posts and likes
        .route("/api/posts", get(posts::get_all_posts).post(posts::create_post))
        .route("/api/posts/feed", get(posts::get_feed))
        .route("/api/posts/liked", get(posts::get_liked_posts))
        .route(
            "/api/posts/:id",
            get(posts::get_post_by_id)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/api/posts/:id/like",
            post(posts::like_post).delete(posts::unlike_post),
        )
        .route("/api/posts/:id/toggle_like", post(posts::toggle_like))
        // Comments
        .route(
            "/api/posts/:id/comments",
            get(comments::get_post_comments).post(comments::create_comment),
        )
        .route(
            "/api/comments/:id",
            get(comments::get_comment_by_id)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        // API documentation
        .route(docs::OPENAPI_JSON_PATH, get(docs::openapi_json))
        .route("/api/docs", get(docs::swagger_ui))
        .with_state(state)
        // Apply middleware stack
        .layer(create_middleware_stack())
}
