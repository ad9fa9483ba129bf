// Models module

pub mod account;
pub mod comment;
pub mod follow;
pub mod like;
pub mod post;
pub mod profile;
pub mod validation;

// Re-export commonly used types
pub use account::{Account, LoginRequest, RefreshRequest, RegisterRequest, RegisterResponse, TokenResponse};
pub use comment::{Comment, CommentRequest};
pub use follow::{DetailResponse, FollowEntry, FollowOutcome};
pub use like::LikeStatus;
pub use post::{CreatePostRequest, ListPostsQuery, Post, UpdatePostRequest};
pub use profile::{ListProfilesQuery, Profile, UpdateProfileRequest};
