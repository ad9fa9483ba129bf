// Post handlers
// HTTP handlers for posts, the follow feed and likes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::{
    auth::AuthUser,
    db::Database,
    error::ApiError,
    extract::AppJson,
    models::{CreatePostRequest, ListPostsQuery, UpdatePostRequest},
};

/// Create a new post authored by the caller
/// POST /api/posts
#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Post created", body = crate::models::Post),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    AppJson(request): AppJson<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Creating new post for profile: {}", user.profile_id);

    let post = db.create_post(user.profile_id, request).await?;

    info!("Successfully created post with id: {}", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

/// Get post by ID
/// GET /api/posts/:id
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = String, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Post", body = crate::models::Post),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_post_by_id(
    _user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching post with id: {}", post_id);

    let post = db.get_post_by_id(&post_id).await?;

    Ok((StatusCode::OK, Json(post)))
}

/// Get all posts, optionally filtered by author or text
/// GET /api/posts?author_id=<id>&search=<text>
#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(ListPostsQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Posts, newest first", body = [crate::models::Post]),
        (status = 400, description = "Invalid author id", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_all_posts(
    _user: AuthUser,
    State(db): State<Arc<Database>>,
    Query(params): Query<ListPostsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(ref author_id) = params.author_id {
        info!("Fetching posts for author_id: {}", author_id);
    } else {
        info!("Fetching all posts");
    }

    let posts = db.get_all_posts(&params).await?;

    info!("Retrieved {} posts", posts.len());
    Ok((StatusCode::OK, Json(posts)))
}

/// Posts written by profiles the caller follows
/// GET /api/posts/feed
#[utoipa::path(
    get,
    path = "/api/posts/feed",
    tag = "posts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Feed, newest first", body = [crate::models::Post])
    )
)]
pub async fn get_feed(
    user: AuthUser,
    State(db): State<Arc<Database>>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = db.get_feed(user.profile_id).await?;

    info!("Retrieved {} feed posts for profile {}", posts.len(), user.profile_id);
    Ok((StatusCode::OK, Json(posts)))
}

/// Edit own post
/// PUT /api/posts/:id
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = String, Path, description = "Post id")),
    request_body = UpdatePostRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated post", body = crate::models::Post),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the author", body = crate::error::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_post(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(post_id): Path<String>,
    AppJson(request): AppJson<UpdatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Updating post with id: {}", post_id);

    let post = db.update_post(user.profile_id, &post_id, request).await?;

    Ok((StatusCode::OK, Json(post)))
}

/// Delete own post
/// DELETE /api/posts/:id
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = String, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Not the author", body = crate::error::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Deleting post with id: {}", post_id);

    db.delete_post(user.profile_id, &post_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Like a post (idempotent)
/// POST /api/posts/:id/like
#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    tag = "likes",
    params(("id" = String, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Post is liked by the caller", body = crate::models::LikeStatus),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn like_post(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = db.like_post(user.profile_id, &post_id).await?;
    Ok((StatusCode::OK, Json(status)))
}

/// Remove the caller's like (idempotent)
/// DELETE /api/posts/:id/like
#[utoipa::path(
    delete,
    path = "/api/posts/{id}/like",
    tag = "likes",
    params(("id" = String, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Post is not liked by the caller", body = crate::models::LikeStatus),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn unlike_post(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = db.unlike_post(user.profile_id, &post_id).await?;
    Ok((StatusCode::OK, Json(status)))
}

/// Flip the caller's like on a post
/// POST /api/posts/:id/toggle_like
#[utoipa::path(
    post,
    path = "/api/posts/{id}/toggle_like",
    tag = "likes",
    params(("id" = String, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "New like state", body = crate::models::LikeStatus),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn toggle_like(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = db.toggle_like(user.profile_id, &post_id).await?;
    Ok((StatusCode::OK, Json(status)))
}

/// Posts the caller has liked
/// GET /api/posts/liked
#[utoipa::path(
    get,
    path = "/api/posts/liked",
    tag = "likes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Liked posts, most recently liked first", body = [crate::models::Post])
    )
)]
pub async fn get_liked_posts(
    user: AuthUser,
    State(db): State<Arc<Database>>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = db.get_liked_posts(user.profile_id).await?;

    info!("Retrieved {} liked posts for profile {}", posts.len(), user.profile_id);
    Ok((StatusCode::OK, Json(posts)))
}
