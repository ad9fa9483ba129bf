// Comment handlers

use axum::{
    extract::{Path, State},
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
    models::CommentRequest,
};

/// List comments on a post, oldest first
/// GET /api/posts/:id/comments
#[utoipa::path(
    get,
    path = "/api/posts/{id}/comments",
    tag = "comments",
    params(("id" = String, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Comments", body = [crate::models::Comment]),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_post_comments(
    _user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = db.get_comments_for_post(&post_id).await?;

    info!("Retrieved {} comments for post {}", comments.len(), post_id);
    Ok((StatusCode::OK, Json(comments)))
}

/// Comment on a post
/// POST /api/posts/:id/comments
#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    tag = "comments",
    params(("id" = String, Path, description = "Post id")),
    request_body = CommentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Comment created", body = crate::models::Comment),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_comment(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(post_id): Path<String>,
    AppJson(request): AppJson<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Creating comment on post {} by profile {}", post_id, user.profile_id);

    let comment = db.create_comment(user.profile_id, &post_id, request).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Get comment by ID
/// GET /api/comments/:id
#[utoipa::path(
    get,
    path = "/api/comments/{id}",
    tag = "comments",
    params(("id" = String, Path, description = "Comment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Comment", body = crate::models::Comment),
        (status = 404, description = "Comment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_comment_by_id(
    _user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = db.get_comment_by_id(&comment_id).await?;
    Ok((StatusCode::OK, Json(comment)))
}

/// Edit own comment
/// PUT /api/comments/:id
#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    tag = "comments",
    params(("id" = String, Path, description = "Comment id")),
    request_body = CommentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated comment", body = crate::models::Comment),
        (status = 403, description = "Not the author", body = crate::error::ErrorResponse),
        (status = 404, description = "Comment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_comment(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(comment_id): Path<String>,
    AppJson(request): AppJson<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = db.update_comment(user.profile_id, &comment_id, request).await?;
    Ok((StatusCode::OK, Json(comment)))
}

/// Delete a comment; authors and staff moderators only
/// DELETE /api/comments/:id
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    params(("id" = String, Path, description = "Comment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Neither author nor moderator", body = crate::error::ErrorResponse),
        (status = 404, description = "Comment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_comment(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Deleting comment with id: {}", comment_id);

    db.delete_comment(user.profile_id, user.is_staff, &comment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
