use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::validation::{
    double_option, is_valid_phone, is_valid_username, limit_text, optional_url, require_text,
};

/// 公開プロフィール。`email` と `date_joined` はアカウント側の列を JOIN して埋める。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
    pub avatar_url: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub date_of_birth: Option<NaiveDate>,
    pub location: String,
    pub phone: String,
    pub followers_count: i64,
    pub following_count: i64,
    pub updated_at: DateTime<Utc>,
}

/// プロフィール更新 API の入力。
/// 文字列フィールドは空文字でクリア、`date_of_birth` は `null` でクリアする。
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub location: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListProfilesQuery {
    /// Case-insensitive substring match, e.g. `?username=dicaprio`
    pub username: Option<String>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.avatar_url.is_none()
            && self.date_of_birth.is_none()
            && self.location.is_none()
            && self.phone.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("At least one field must be provided for update".to_string());
        }

        if let Some(ref username) = self.username {
            require_text("Username", username, 50)?;
            if !is_valid_username(username.trim()) {
                return Err(
                    "Username may only contain letters, digits, '_', '.' and '-'".to_string(),
                );
            }
        }

        if let Some(ref first_name) = self.first_name {
            require_text("First name", first_name, 50)?;
        }

        if let Some(ref last_name) = self.last_name {
            require_text("Last name", last_name, 50)?;
        }

        if let Some(ref bio) = self.bio {
            limit_text("Bio", bio, 5000)?;
        }

        if let Some(ref location) = self.location {
            limit_text("Location", location, 255)?;
        }

        if let Some(ref phone) = self.phone {
            let phone = phone.trim();
            if !phone.is_empty() {
                limit_text("Phone", phone, 20)?;
                if !is_valid_phone(phone) {
                    return Err("Invalid phone number format".to_string());
                }
            }
        }

        optional_url("Avatar URL", self.avatar_url.as_deref())?;

        if let Some(Some(date_of_birth)) = self.date_of_birth {
            if date_of_birth > Utc::now().date_naive() {
                return Err("Date of birth cannot be in the future".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_is_rejected() {
        let request = UpdateProfileRequest::default();
        assert!(request.is_empty());
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_profile_validation() {
        let valid = UpdateProfileRequest {
            bio: Some("Actor.".to_string()),
            phone: Some("+1 555 0100".to_string()),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        // Blank values clear optional text fields
        let clearing = UpdateProfileRequest {
            bio: Some(String::new()),
            location: Some(String::new()),
            phone: Some(String::new()),
            avatar_url: Some(String::new()),
            ..Default::default()
        };
        assert!(clearing.validate().is_ok());

        let blank_name = UpdateProfileRequest {
            first_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank_name.validate().is_err());

        let bad_phone = UpdateProfileRequest {
            phone: Some("five".to_string()),
            ..Default::default()
        };
        assert!(bad_phone.validate().is_err());

        let bad_avatar = UpdateProfileRequest {
            avatar_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(bad_avatar.validate().is_err());
    }

    #[test]
    fn test_future_date_of_birth_is_rejected() {
        let tomorrow = Utc::now().date_naive().succ_opt().expect("valid date");
        let request = UpdateProfileRequest {
            date_of_birth: Some(Some(tomorrow)),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_date_of_birth_null_vs_absent() {
        let absent: UpdateProfileRequest =
            serde_json::from_str(r#"{"bio":"hi"}"#).expect("deserialize");
        assert_eq!(absent.date_of_birth, None);

        let cleared: UpdateProfileRequest =
            serde_json::from_str(r#"{"date_of_birth":null}"#).expect("deserialize");
        assert_eq!(cleared.date_of_birth, Some(None));
        assert!(cleared.validate().is_ok());

        let set: UpdateProfileRequest =
            serde_json::from_str(r#"{"date_of_birth":"1974-11-11"}"#).expect("deserialize");
        assert_eq!(
            set.date_of_birth,
            Some(NaiveDate::from_ymd_opt(1974, 11, 11))
        );
    }

    #[test]
    fn test_full_name() {
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            username: "dicaprio".to_string(),
            email: "leo@example.com".to_string(),
            date_joined: Utc::now(),
            avatar_url: None,
            first_name: "Leonardo".to_string(),
            last_name: "DiCaprio".to_string(),
            bio: String::new(),
            date_of_birth: None,
            location: String::new(),
            phone: String::new(),
            followers_count: 0,
            following_count: 0,
            updated_at: Utc::now(),
        };

        assert_eq!(profile.full_name(), "Leonardo DiCaprio");
    }
}
