use axum::Json;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginInput, RegisterInput, UserService};

/// POST /auth/register - create a new account
pub async fn register(Json(payload): Json<RegisterInput>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let user = UserService::new(pool).register(payload).await?;

    Ok(ApiResponse::created(json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
    })))
}

/// POST /auth/login - authenticate and receive a bearer token
pub async fn login(Json(payload): Json<LoginInput>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let session = UserService::new(pool).login(payload).await?;

    Ok(ApiResponse::success(json!({
        "token": session.token,
        "user": {
            "id": session.user.id,
            "email": session.user.email,
            "name": session.user.name,
        },
        "expires_in": session.expires_in,
    })))
}
