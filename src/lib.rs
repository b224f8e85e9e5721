pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Build the full application router
pub fn app() -> Router {
    let media_root = config::config().media.root.clone();

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (token acquisition)
        .merge(auth_public_routes())
        // Protected API
        .merge(api_routes())
        // Uploaded recipe images
        .nest_service("/media", ServeDir::new(media_root))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn api_routes() -> Router {
    use handlers::protected::{attributes, recipes};

    Router::new()
        // Owner-scoped attribute collections
        .route("/api/tags", get(attributes::tag_get).post(attributes::tag_post))
        .route(
            "/api/ingredients",
            get(attributes::ingredient_get).post(attributes::ingredient_post),
        )
        // Recipes
        .route("/api/recipes", get(recipes::recipe_get).post(recipes::recipe_post))
        .route(
            "/api/recipes/:id",
            get(recipes::recipe_id_get)
                .put(recipes::recipe_id_put)
                .patch(recipes::recipe_id_patch)
                .delete(recipes::recipe_id_delete),
        )
        // Image attachment side-channel
        .route("/api/recipes/:id/upload-image", post(recipes::recipe_image_post))
        .layer(DefaultBodyLimit::max(config::config().media.max_upload_bytes))
        .route_layer(axum::middleware::from_fn(middleware::jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Larder API",
            "version": version,
            "description": "Recipe catalog backend API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login (public - token acquisition)",
                "tags": "/api/tags (protected)",
                "ingredients": "/api/ingredients (protected)",
                "recipes": "/api/recipes[/:id] (protected)",
                "images": "/api/recipes/:id/upload-image (protected)",
                "media": "/media/* (public)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
