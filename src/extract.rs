// Request extractors

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` と同じだが、デシリアライズ失敗を `ApiError::Validation` (400) として返す。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
