//! HS256 access/refresh tokens signed with the configured `JWT_SECRET`.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::models::{Account, TokenResponse};

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims: registered claims plus the caller's profile and moderator flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User (account) id
    pub sub: Uuid,
    pub profile_id: Uuid,
    pub is_staff: bool,
    pub token_type: TokenType,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// 署名鍵と有効期限を保持し、トークンの発行と検証を担う。
/// 起動時に一度だけ作り、`Arc` で各ハンドラに共有する。
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        TokenService {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            access_ttl_secs: config.access_token_ttl.as_secs() as i64,
            refresh_ttl_secs: config.refresh_token_ttl.as_secs() as i64,
        }
    }

    /// Issue a fresh access + refresh pair for the account.
    pub fn issue_pair(&self, account: &Account) -> Result<TokenResponse, ApiError> {
        let access_token = self.issue(account, TokenType::Access)?;
        let refresh_token = self.issue(account, TokenType::Refresh)?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl_secs,
        })
    }

    fn issue(&self, account: &Account, token_type: TokenType) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl_secs,
            TokenType::Refresh => self.refresh_ttl_secs,
        };

        let claims = Claims {
            sub: account.id,
            profile_id: account.profile_id,
            is_staff: account.is_staff,
            token_type,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + ttl,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to sign token: {}", e)))
    }

    /// Decode a token, check signature, expiry and issuer, and require the expected type.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;

        if claims.token_type != expected {
            return Err(ApiError::unauthorized(match expected {
                TokenType::Access => "Access token required",
                TokenType::Refresh => "Refresh token required",
            }));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            issuer: "social-media-api".to_string(),
            access_token_ttl: Duration::from_secs(3600),
            refresh_token_ttl: Duration::from_secs(30 * 24 * 3600),
        }
    }

    fn account() -> Account {
        Account {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            email: "leo@example.com".to_string(),
            password_hash: String::new(),
            is_staff: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_validate_pair() {
        let service = TokenService::new(&config("0123456789abcdef0123456789abcdef"));
        let account = account();

        let tokens = service.issue_pair(&account).unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 3600);

        let access = service.validate(&tokens.access_token, TokenType::Access).unwrap();
        assert_eq!(access.sub, account.id);
        assert_eq!(access.profile_id, account.profile_id);
        assert!(!access.is_staff);
        assert_eq!(access.exp - access.iat, 3600);

        let refresh = service.validate(&tokens.refresh_token, TokenType::Refresh).unwrap();
        assert_eq!(refresh.sub, account.id);
        assert_eq!(refresh.exp - refresh.iat, 30 * 24 * 3600);
    }

    #[test]
    fn test_token_type_is_enforced() {
        let service = TokenService::new(&config("0123456789abcdef0123456789abcdef"));
        let tokens = service.issue_pair(&account()).unwrap();

        assert!(matches!(
            service.validate(&tokens.refresh_token, TokenType::Access),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            service.validate(&tokens.access_token, TokenType::Refresh),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let issuer = TokenService::new(&config("0123456789abcdef0123456789abcdef"));
        let verifier = TokenService::new(&config("fedcba9876543210fedcba9876543210"));
        let tokens = issuer.issue_pair(&account()).unwrap();

        assert!(matches!(
            verifier.validate(&tokens.access_token, TokenType::Access),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = TokenService::new(&config("0123456789abcdef0123456789abcdef"));
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            is_staff: false,
            token_type: TokenType::Access,
            iss: "social-media-api".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(b"0123456789abcdef0123456789abcdef"),
        )
        .unwrap();

        match service.validate(&token, TokenType::Access) {
            Err(ApiError::Unauthorized(message)) => assert_eq!(message, "Token has expired"),
            other => panic!("expected expiry rejection, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = TokenService::new(&config("0123456789abcdef0123456789abcdef"));
        assert!(service.validate("not.a.jwt", TokenType::Access).is_err());
    }
}
