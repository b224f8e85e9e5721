// In-process router checks that need no database: the authentication wall
// and filter parameter validation.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use larder_api::auth::{generate_jwt, Claims};

#[tokio::test]
async fn root_banner_is_public() {
    let app = larder_api::app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_routes_require_authentication() {
    let app = larder_api::app();
    let routes = [
        ("GET", "/api/tags"),
        ("POST", "/api/tags"),
        ("GET", "/api/ingredients"),
        ("POST", "/api/ingredients"),
        ("GET", "/api/recipes"),
        ("POST", "/api/recipes"),
        ("GET", "/api/recipes/1"),
        ("PUT", "/api/recipes/1"),
        ("PATCH", "/api/recipes/1"),
        ("DELETE", "/api/recipes/1"),
        ("POST", "/api/recipes/1/upload-image"),
    ];

    for (method, uri) in routes {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn malformed_bearer_token_is_unauthorized() {
    let app = larder_api::app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tags")
                .header("authorization", "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_filter_parameter_is_a_bad_request() {
    // Filter parsing happens before any database work, so this holds even
    // without a configured database
    let token = generate_jwt(Claims::new(1, "filter-test@example.com".to_string())).unwrap();

    let app = larder_api::app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recipes?tags=1,abc")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
