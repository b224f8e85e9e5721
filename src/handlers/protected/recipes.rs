use axum::{
    extract::{Multipart, Path, Query},
    Extension, Json,
};
use serde::Deserialize;

use crate::api::shapes::RecipeShape;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::filter::RecipeFilter;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{RecipeInput, RecipePatch, RecipeService};

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    /// Comma-separated tag ids; any-match restriction
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; any-match restriction
    pub ingredients: Option<String>,
}

/// GET /api/recipes - list the caller's recipes, summary shape
pub async fn recipe_get(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RecipeListQuery>,
) -> ApiResult<Vec<RecipeShape>> {
    let filter = RecipeFilter::parse(
        user.user_id,
        query.tags.as_deref(),
        query.ingredients.as_deref(),
    )?;

    let pool = DatabaseManager::pool().await?;
    let recipes = RecipeService::new(pool).list(&filter).await?;
    Ok(ApiResponse::success(recipes))
}

/// POST /api/recipes - create a recipe owned by the caller
pub async fn recipe_post(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RecipeInput>,
) -> ApiResult<RecipeShape> {
    let pool = DatabaseManager::pool().await?;
    let recipe = RecipeService::new(pool).create(user.user_id, payload).await?;
    Ok(ApiResponse::created(recipe))
}

/// GET /api/recipes/:id - retrieve one recipe, detail shape
pub async fn recipe_id_get(
    Extension(user): Extension<AuthUser>,
    Path(recipe_id): Path<i64>,
) -> ApiResult<RecipeShape> {
    let pool = DatabaseManager::pool().await?;
    let recipe = RecipeService::new(pool).get_detail(user.user_id, recipe_id).await?;
    Ok(ApiResponse::success(recipe))
}

/// PUT /api/recipes/:id - full update, attribute sets replaced wholesale
pub async fn recipe_id_put(
    Extension(user): Extension<AuthUser>,
    Path(recipe_id): Path<i64>,
    Json(payload): Json<RecipeInput>,
) -> ApiResult<RecipeShape> {
    let pool = DatabaseManager::pool().await?;
    let recipe = RecipeService::new(pool)
        .update_full(user.user_id, recipe_id, payload)
        .await?;
    Ok(ApiResponse::success(recipe))
}

/// PATCH /api/recipes/:id - partial update, only supplied fields change
pub async fn recipe_id_patch(
    Extension(user): Extension<AuthUser>,
    Path(recipe_id): Path<i64>,
    Json(payload): Json<RecipePatch>,
) -> ApiResult<RecipeShape> {
    let pool = DatabaseManager::pool().await?;
    let recipe = RecipeService::new(pool)
        .update_partial(user.user_id, recipe_id, payload)
        .await?;
    Ok(ApiResponse::success(recipe))
}

/// DELETE /api/recipes/:id
pub async fn recipe_id_delete(
    Extension(user): Extension<AuthUser>,
    Path(recipe_id): Path<i64>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    RecipeService::new(pool).delete(user.user_id, recipe_id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/recipes/:id/upload-image - attach an image, multipart field `image`
pub async fn recipe_image_post(
    Extension(user): Extension<AuthUser>,
    Path(recipe_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<serde_json::Value> {
    let mut image_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read image field: {}", e)))?;
            image_bytes = Some(bytes);
            break;
        }
    }

    let bytes = image_bytes.ok_or_else(|| ApiError::field_error("image", "No image provided"))?;

    let pool = DatabaseManager::pool().await?;
    let recipe = RecipeService::new(pool)
        .attach_image(user.user_id, recipe_id, &bytes)
        .await?;
    Ok(ApiResponse::success(serde_json::json!({
        "id": recipe.id,
        "image": crate::api::shapes::image_url(&recipe),
    })))
}
