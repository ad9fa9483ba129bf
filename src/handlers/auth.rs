// Auth handlers
// Registration, login, token refresh and the current-user lookup

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    auth::{password, AuthUser, TokenService, TokenType},
    db::Database,
    error::{ApiError, ApiResult},
    extract::AppJson,
    models::{LoginRequest, RefreshRequest, RegisterRequest, RegisterResponse},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Argon2 は CPU を食うので、ランタイムのワーカーをブロックしないよう別スレッドで回す。
async fn run_blocking<T, F>(task: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Password task failed: {}", e)))?
}

/// Register a new account and its profile
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Email or username taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(db): State<Arc<Database>>,
    State(tokens): State<Arc<TokenService>>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Registering new account with username: {}", request.username.trim());

    request.validate().map_err(ApiError::Validation)?;

    let plain = request.password.clone();
    let password_hash = run_blocking(move || password::hash_password(&plain)).await?;

    let (account, profile) = db.create_account(&request, &password_hash).await?;
    let tokens = tokens.issue_pair(&account)?;

    info!("Successfully registered account with id: {}", account.id);
    Ok((StatusCode::CREATED, Json(RegisterResponse { profile, tokens })))
}

/// Exchange email and password for a token pair
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = crate::models::TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(db): State<Arc<Database>>,
    State(tokens): State<Arc<TokenService>>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate().map_err(ApiError::Validation)?;

    let email = request.normalized_email();
    let plain = request.password;
    let account = match db.find_account_by_email(&email).await? {
        Some(account) => account,
        None => {
            // Same Argon2 cost as a wrong password, so timing does not reveal registered emails
            run_blocking(move || password::verify_against_dummy(&plain)).await?;
            warn!("Login attempt for unknown email");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let stored_hash = account.password_hash.clone();
    let verified = run_blocking(move || password::verify_password(&plain, &stored_hash)).await?;
    if !verified {
        warn!("Failed login for account {}", account.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    info!("Account {} logged in", account.id);
    Ok((StatusCode::OK, Json(tokens.issue_pair(&account)?)))
}

/// Trade a refresh token for a new token pair
/// POST /api/auth/refresh
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = crate::models::TokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = crate::error::ErrorResponse)
    )
)]
pub async fn refresh(
    State(db): State<Arc<Database>>,
    State(tokens): State<Arc<TokenService>>,
    AppJson(request): AppJson<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = tokens.validate(request.refresh_token.trim(), TokenType::Refresh)?;

    // Re-read the account so a deleted user or a changed staff flag is picked up
    let account = db
        .find_account_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    info!("Refreshed tokens for account {}", account.id);
    Ok((StatusCode::OK, Json(tokens.issue_pair(&account)?)))
}

/// Current caller's profile
/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = crate::models::Profile),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    user: AuthUser,
    State(db): State<Arc<Database>>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = db.get_profile_by_uuid(user.profile_id).await?;
    Ok((StatusCode::OK, Json(profile)))
}
