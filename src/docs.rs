// OpenAPI document and the interactive docs page

use axum::{response::Html, Json};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::{
    error::{ErrorDetail, ErrorResponse},
    handlers,
    models::{
        Comment, CommentRequest, CreatePostRequest, DetailResponse, FollowEntry, LikeStatus,
        LoginRequest, Post, Profile, RefreshRequest, RegisterRequest, RegisterResponse,
        TokenResponse, UpdatePostRequest, UpdateProfileRequest,
    },
};

pub const OPENAPI_JSON_PATH: &str = "/api/docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Social Media API",
        version = "0.1.0",
        description = "Profiles, follows, posts, likes and comments over a JWT-protected REST API."
    ),
    paths(
        handlers::health_check,
        handlers::readiness_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::profiles::get_all_profiles,
        handlers::profiles::get_profile_by_id,
        handlers::profiles::update_profile,
        handlers::profiles::delete_profile,
        handlers::profiles::follow_profile,
        handlers::profiles::unfollow_profile,
        handlers::profiles::get_followers,
        handlers::profiles::get_following,
        handlers::posts::create_post,
        handlers::posts::get_all_posts,
        handlers::posts::get_feed,
        handlers::posts::get_post_by_id,
        handlers::posts::update_post,
        handlers::posts::delete_post,
        handlers::posts::like_post,
        handlers::posts::unlike_post,
        handlers::posts::toggle_like,
        handlers::posts::get_liked_posts,
        handlers::comments::get_post_comments,
        handlers::comments::create_comment,
        handlers::comments::get_comment_by_id,
        handlers::comments::update_comment,
        handlers::comments::delete_comment,
    ),
    components(schemas(
        ErrorResponse,
        ErrorDetail,
        RegisterRequest,
        LoginRequest,
        RefreshRequest,
        TokenResponse,
        RegisterResponse,
        Profile,
        UpdateProfileRequest,
        FollowEntry,
        DetailResponse,
        Post,
        CreatePostRequest,
        UpdatePostRequest,
        LikeStatus,
        Comment,
        CommentRequest,
    )),
    tags(
        (name = "health", description = "Liveness and readiness checks"),
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "profiles", description = "Public profiles"),
        (name = "follows", description = "Follow graph"),
        (name = "posts", description = "Posts and the follow feed"),
        (name = "likes", description = "Post likes"),
        (name = "comments", description = "Comments on posts"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /api/auth/login"))
                        .build(),
                ),
            )
        }
    }
}

/// GET /api/docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// GET /api/docs
/// swagger-ui のアセットは CDN から読み込む。ビルド時のダウンロードを避けるため。
pub async fn swagger_ui() -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Social Media API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{ url: "{}", dom_id: "#swagger-ui" }});
    }};
  </script>
</body>
</html>"##,
        OPENAPI_JSON_PATH
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/health",
            "/api/auth/login",
            "/api/profiles/{id}/follow",
            "/api/posts/{id}/toggle_like",
            "/api/comments/{id}",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[tokio::test]
    async fn test_swagger_page_points_at_json() {
        let Html(page) = swagger_ui().await;
        assert!(page.contains(&format!(r#"url: "{}""#, OPENAPI_JSON_PATH)));
        assert!(page.contains(r##"dom_id: "#swagger-ui""##));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
