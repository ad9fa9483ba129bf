// Authentication: password hashing, JWT issuance and the bearer-token extractor

pub mod jwt;
pub mod password;

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::error::ApiError;
pub use jwt::{Claims, TokenService, TokenType};

/// 認証済みの呼び出し元。ハンドラの引数に置くだけで Bearer トークンの検証が走る。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub is_staff: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            user_id: claims.sub,
            profile_id: claims.profile_id,
            is_staff: claims.is_staff,
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?
            .to_str()
            .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;

        let token = bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Authorization header must use the Bearer scheme"))?;

        let tokens = Arc::<TokenService>::from_ref(state);
        let claims = tokens.validate(token, TokenType::Access)?;

        Ok(AuthUser::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::models::Account;
    use axum::http::Request;
    use chrono::Utc;
    use std::time::Duration;

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(&AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            issuer: "social-media-api".to_string(),
            access_token_ttl: Duration::from_secs(3600),
            refresh_token_ttl: Duration::from_secs(86400),
        }))
    }

    fn extract(state: &Arc<TokenService>, authorization: Option<&str>) -> Result<AuthUser, ApiError> {
        let mut builder = Request::builder().uri("/api/posts");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();

        tokio_test::block_on(AuthUser::from_request_parts(&mut parts, state))
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn test_extractor_accepts_access_token() {
        let state = token_service();
        let account = Account {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            email: "mod@example.com".to_string(),
            password_hash: String::new(),
            is_staff: true,
            created_at: Utc::now(),
        };
        let tokens = state.issue_pair(&account).unwrap();

        let user = extract(&state, Some(&format!("Bearer {}", tokens.access_token))).unwrap();
        assert_eq!(user.user_id, account.id);
        assert_eq!(user.profile_id, account.profile_id);
        assert!(user.is_staff);
    }

    #[test]
    fn test_extractor_rejects_missing_or_wrong_tokens() {
        let state = token_service();

        assert!(matches!(extract(&state, None), Err(ApiError::Unauthorized(_))));
        assert!(matches!(
            extract(&state, Some("Token abc")),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            extract(&state, Some("Bearer not-a-jwt")),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
