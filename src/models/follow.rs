use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One row of a followers / following listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FollowEntry {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub followed_at: DateTime<Utc>,
}

/// Result of a follow / unfollow call, before it is rendered as a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
    Unfollowed,
    NotFollowing,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetailResponse {
    pub detail: String,
}

impl FollowOutcome {
    pub fn detail(self, target_full_name: &str) -> DetailResponse {
        let detail = match self {
            FollowOutcome::Followed => format!("You are now following {}.", target_full_name),
            FollowOutcome::AlreadyFollowing => "You are already following this user.".to_string(),
            FollowOutcome::Unfollowed => format!("You have unfollowed {}.", target_full_name),
            FollowOutcome::NotFollowing => "You are not following this user.".to_string(),
        };

        DetailResponse { detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_outcome_messages() {
        assert_eq!(
            FollowOutcome::Followed.detail("Kate Winslet").detail,
            "You are now following Kate Winslet."
        );
        assert_eq!(
            FollowOutcome::Unfollowed.detail("Kate Winslet").detail,
            "You have unfollowed Kate Winslet."
        );
        assert_eq!(
            FollowOutcome::AlreadyFollowing.detail("Kate Winslet").detail,
            "You are already following this user."
        );
        assert_eq!(
            FollowOutcome::NotFollowing.detail("Kate Winslet").detail,
            "You are not following this user."
        );
    }

    #[test]
    fn test_detail_serialization() {
        let json = serde_json::to_string(&FollowOutcome::Followed.detail("Kate Winslet"))
            .expect("Failed to serialize detail");
        assert_eq!(json, r#"{"detail":"You are now following Kate Winslet."}"#);
    }
}
