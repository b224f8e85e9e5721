use axum::{extract::Query, Extension, Json};
use serde::Deserialize;

use crate::api::shapes::AttributeShape;
use crate::database::manager::DatabaseManager;
use crate::database::models::AttributeKind;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::AttributeService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub assigned_only: Option<String>,
}

impl ListQuery {
    /// Flag semantics: truthy when present with a non-empty value
    fn assigned_only(&self) -> bool {
        self.assigned_only.as_deref().map(|v| !v.is_empty()).unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAttribute {
    #[serde(default)]
    pub name: String,
}

async fn list(kind: AttributeKind, user: AuthUser, query: ListQuery) -> ApiResult<Vec<AttributeShape>> {
    let pool = DatabaseManager::pool().await?;
    let attributes = AttributeService::new(pool, kind)
        .list(user.user_id, query.assigned_only())
        .await?;
    Ok(ApiResponse::success(
        attributes.iter().map(AttributeShape::from).collect(),
    ))
}

async fn create(kind: AttributeKind, user: AuthUser, payload: CreateAttribute) -> ApiResult<AttributeShape> {
    let pool = DatabaseManager::pool().await?;
    let attribute = AttributeService::new(pool, kind)
        .create(user.user_id, &payload.name)
        .await?;
    Ok(ApiResponse::created(AttributeShape::from(&attribute)))
}

/// GET /api/tags - list the caller's tags
pub async fn tag_get(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<AttributeShape>> {
    list(AttributeKind::Tag, user, query).await
}

/// POST /api/tags - create a tag owned by the caller
pub async fn tag_post(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateAttribute>,
) -> ApiResult<AttributeShape> {
    create(AttributeKind::Tag, user, payload).await
}

/// GET /api/ingredients - list the caller's ingredients
pub async fn ingredient_get(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<AttributeShape>> {
    list(AttributeKind::Ingredient, user, query).await
}

/// POST /api/ingredients - create an ingredient owned by the caller
pub async fn ingredient_post(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateAttribute>,
) -> ApiResult<AttributeShape> {
    create(AttributeKind::Ingredient, user, payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigned_only_is_truthy_when_non_empty() {
        let query = ListQuery { assigned_only: Some("1".to_string()) };
        assert!(query.assigned_only());

        let query = ListQuery { assigned_only: Some(String::new()) };
        assert!(!query.assigned_only());

        let query = ListQuery { assigned_only: None };
        assert!(!query.assigned_only());
    }
}
