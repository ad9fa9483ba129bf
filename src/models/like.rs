use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Like state of a post from the caller's point of view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LikeStatus {
    pub post_id: Uuid,
    pub liked: bool,
    pub likes_count: i64,
}
