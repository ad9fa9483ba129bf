// Profile handlers
// HTTP handlers for profiles and the follow graph

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
    models::{ListProfilesQuery, UpdateProfileRequest},
};

/// List profiles, optionally filtered by username
/// GET /api/profiles?username=<substring>
#[utoipa::path(
    get,
    path = "/api/profiles",
    tag = "profiles",
    params(ListProfilesQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Matching profiles", body = [crate::models::Profile]),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_all_profiles(
    _user: AuthUser,
    State(db): State<Arc<Database>>,
    Query(params): Query<ListProfilesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(ref username) = params.username {
        info!("Searching profiles by username: {}", username);
    } else {
        info!("Fetching all profiles");
    }

    let profiles = db.get_all_profiles(params.username.as_ref()).await?;

    info!("Retrieved {} profiles", profiles.len());
    Ok((StatusCode::OK, Json(profiles)))
}

/// Get profile by ID
/// GET /api/profiles/:id
#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    tag = "profiles",
    params(("id" = String, Path, description = "Profile id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = crate::models::Profile),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_profile_by_id(
    _user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(profile_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching profile with id: {}", profile_id);

    let profile = db.get_profile_by_id(&profile_id).await?;

    Ok((StatusCode::OK, Json(profile)))
}

/// Update own profile
/// PUT/PATCH /api/profiles/:id
#[utoipa::path(
    put,
    path = "/api/profiles/{id}",
    tag = "profiles",
    params(("id" = String, Path, description = "Profile id")),
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated profile", body = crate::models::Profile),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Username taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(profile_id): Path<String>,
    AppJson(request): AppJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Updating profile with id: {}", profile_id);

    let profile = db.update_profile(user.profile_id, &profile_id, request).await?;

    info!("Successfully updated profile with id: {}", profile_id);
    Ok((StatusCode::OK, Json(profile)))
}

/// Delete own profile together with the account
/// DELETE /api/profiles/:id
#[utoipa::path(
    delete,
    path = "/api/profiles/{id}",
    tag = "profiles",
    params(("id" = String, Path, description = "Profile id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Account removed"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_profile(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(profile_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Deleting profile with id: {}", profile_id);

    db.delete_profile(user.profile_id, &profile_id).await?;

    info!("Successfully deleted account for profile {} (cascade deleted follows, posts, likes and comments)", profile_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Follow a profile
/// POST /api/profiles/:id/follow
#[utoipa::path(
    post,
    path = "/api/profiles/{id}/follow",
    tag = "follows",
    params(("id" = String, Path, description = "Profile to follow")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Followed, or already following", body = crate::models::DetailResponse),
        (status = 400, description = "Cannot follow yourself", body = crate::error::ErrorResponse),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn follow_profile(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(profile_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (outcome, target) = db.follow_profile(user.profile_id, &profile_id).await?;
    Ok((StatusCode::OK, Json(outcome.detail(&target.full_name()))))
}

/// Unfollow a profile
/// POST /api/profiles/:id/unfollow
#[utoipa::path(
    post,
    path = "/api/profiles/{id}/unfollow",
    tag = "follows",
    params(("id" = String, Path, description = "Profile to unfollow")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unfollowed, or was not following", body = crate::models::DetailResponse),
        (status = 400, description = "Cannot unfollow yourself", body = crate::error::ErrorResponse),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn unfollow_profile(
    user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(profile_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (outcome, target) = db.unfollow_profile(user.profile_id, &profile_id).await?;
    Ok((StatusCode::OK, Json(outcome.detail(&target.full_name()))))
}

/// Profiles following the given profile
/// GET /api/profiles/:id/followers
#[utoipa::path(
    get,
    path = "/api/profiles/{id}/followers",
    tag = "follows",
    params(("id" = String, Path, description = "Profile id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Followers, newest first", body = [crate::models::FollowEntry]),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_followers(
    _user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(profile_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let followers = db.get_followers(&profile_id).await?;

    info!("Retrieved {} followers for profile {}", followers.len(), profile_id);
    Ok((StatusCode::OK, Json(followers)))
}

/// Profiles the given profile follows
/// GET /api/profiles/:id/following
#[utoipa::path(
    get,
    path = "/api/profiles/{id}/following",
    tag = "follows",
    params(("id" = String, Path, description = "Profile id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Followed profiles, newest first", body = [crate::models::FollowEntry]),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_following(
    _user: AuthUser,
    State(db): State<Arc<Database>>,
    Path(profile_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let following = db.get_following(&profile_id).await?;

    info!("Retrieved {} followed profiles for profile {}", following.len(), profile_id);
    Ok((StatusCode::OK, Json(following)))
}
