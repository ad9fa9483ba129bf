use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::profile::Profile;
use super::validation::{is_valid_email, is_valid_username, require_text};

/// ログイン可能なアカウント。パスワードハッシュを含むため API には直接返さない。
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// 新規登録 API の入力。アカウントとプロフィールを同時に作成する。
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Access/refresh token pair handed out on register, login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub profile: Profile,
    pub tokens: TokenResponse,
}

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), String> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err("Email cannot be empty".to_string());
        }
        if email.len() > 255 {
            return Err("Email cannot exceed 255 characters".to_string());
        }
        if !is_valid_email(email) {
            return Err("Invalid email format".to_string());
        }

        validate_password(&self.password)?;

        let username = self.username.trim();
        require_text("Username", username, 50)?;
        if !is_valid_username(username) {
            return Err(
                "Username may only contain letters, digits, '_', '.' and '-'".to_string(),
            );
        }

        require_text("First name", &self.first_name, 50)?;
        require_text("Last name", &self.last_name, 50)?;

        Ok(())
    }

    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("Email and password are required".to_string());
        }
        Ok(())
    }

    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Password policy: 8..=128 characters with at least one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(format!("Password cannot exceed {} characters", MAX_PASSWORD_LEN));
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err("Password must contain at least one letter and one digit".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: "  Leo@Example.com ".to_string(),
            password: "titanic1997".to_string(),
            username: "dicaprio".to_string(),
            first_name: "Leonardo".to_string(),
            last_name: "DiCaprio".to_string(),
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register_request().validate().is_ok());

        let mut bad_email = register_request();
        bad_email.email = "not-an-email".to_string();
        assert!(bad_email.validate().is_err());

        let mut bad_username = register_request();
        bad_username.username = "leo dicaprio".to_string();
        assert!(bad_username.validate().is_err());

        let mut long_username = register_request();
        long_username.username = "a".repeat(51);
        assert!(long_username.validate().is_err());

        let mut no_last_name = register_request();
        no_last_name.last_name = "  ".to_string();
        assert_eq!(no_last_name.validate().unwrap_err(), "Last name cannot be empty");
    }

    #[test]
    fn test_register_request_normalizes_email() {
        assert_eq!(register_request().normalized_email(), "leo@example.com");
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("abcdefg1").is_ok());

        assert!(validate_password("abc1").is_err());
        assert!(validate_password("abcdefgh").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password(&format!("a1{}", "x".repeat(MAX_PASSWORD_LEN))).is_err());
    }

    #[test]
    fn test_login_request_validation() {
        let request = LoginRequest {
            email: "leo@example.com".to_string(),
            password: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_token_response_serialization() {
        let tokens = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        };

        let json = serde_json::to_string(&tokens).expect("Failed to serialize tokens");
        assert_eq!(
            json,
            r#"{"access_token":"a","refresh_token":"r","token_type":"Bearer","expires_in":3600}"#
        );
    }
}
