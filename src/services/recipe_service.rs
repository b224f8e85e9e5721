use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};

use crate::api::shapes::RecipeShape;
use crate::database::models::{Attribute, AttributeKind, Recipe};
use crate::error::ApiError;
use crate::filter::RecipeFilter;
use crate::services::image_service::ImageService;

/// Full write payload: create and full update. Omitted attribute lists mean
/// an empty set, so a full update with no `tags` clears the recipe's tags.
#[derive(Debug, Deserialize)]
pub struct RecipeInput {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub ingredients: Vec<i64>,
}

/// Partial write payload: only supplied fields are touched. A supplied
/// attribute list replaces the previous set wholesale.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

/// Owner-scoped recipe store: querying, mutation and image attachment.
/// Every statement carries the caller's id in its WHERE clause or insert
/// values; an ownership mismatch is reported as not-found.
pub struct RecipeService {
    pool: PgPool,
    images: ImageService,
}

impl RecipeService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            images: ImageService::from_config(),
        }
    }

    pub fn with_images(pool: PgPool, images: ImageService) -> Self {
        Self { pool, images }
    }

    /// List recipes matching the filter, summary shape, newest first
    pub async fn list(&self, filter: &RecipeFilter) -> Result<Vec<RecipeShape>, ApiError> {
        let sql = filter.to_sql();
        let mut query = sqlx::query_as::<_, Recipe>(&sql.query);
        for param in sql.params {
            query = query.bind(param);
        }
        let recipes = query.fetch_all(&self.pool).await?;

        let recipe_ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
        let mut tag_ids = self.load_link_ids(AttributeKind::Tag, &recipe_ids).await?;
        let mut ingredient_ids = self.load_link_ids(AttributeKind::Ingredient, &recipe_ids).await?;

        Ok(recipes
            .iter()
            .map(|recipe| {
                RecipeShape::summary(
                    recipe,
                    tag_ids.remove(&recipe.id).unwrap_or_default(),
                    ingredient_ids.remove(&recipe.id).unwrap_or_default(),
                )
            })
            .collect())
    }

    /// Retrieve one recipe in detail shape with expanded attributes
    pub async fn get_detail(&self, owner_id: i64, recipe_id: i64) -> Result<RecipeShape, ApiError> {
        let recipe = self.fetch_owned(owner_id, recipe_id).await?;
        let tags = self.load_linked_attributes(AttributeKind::Tag, recipe.id).await?;
        let ingredients = self.load_linked_attributes(AttributeKind::Ingredient, recipe.id).await?;
        Ok(RecipeShape::detail(&recipe, &tags, &ingredients))
    }

    /// Create a recipe owned by the caller
    pub async fn create(&self, owner_id: i64, input: RecipeInput) -> Result<RecipeShape, ApiError> {
        let title = validate_title(&input.title)?;
        validate_time_minutes(input.time_minutes)?;
        validate_price(input.price)?;

        let tag_ids = self.resolve_owned(AttributeKind::Tag, owner_id, &input.tags).await?;
        let ingredient_ids = self
            .resolve_owned(AttributeKind::Ingredient, owner_id, &input.ingredients)
            .await?;

        let mut tx = self.pool.begin().await?;
        let recipe = sqlx::query_as::<_, Recipe>(
            "INSERT INTO recipe (user_id, title, time_minutes, price) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(owner_id)
        .bind(&title)
        .bind(input.time_minutes)
        .bind(input.price)
        .fetch_one(&mut *tx)
        .await?;

        insert_links(&mut tx, AttributeKind::Tag, recipe.id, &tag_ids).await?;
        insert_links(&mut tx, AttributeKind::Ingredient, recipe.id, &ingredient_ids).await?;
        tx.commit().await?;

        Ok(RecipeShape::summary(&recipe, tag_ids, ingredient_ids))
    }

    /// Full update: every field is written, attribute sets replaced wholesale
    pub async fn update_full(
        &self,
        owner_id: i64,
        recipe_id: i64,
        input: RecipeInput,
    ) -> Result<RecipeShape, ApiError> {
        // Existence/ownership first: a missing recipe is 404 even when the
        // payload would also fail validation
        self.fetch_owned(owner_id, recipe_id).await?;

        let title = validate_title(&input.title)?;
        validate_time_minutes(input.time_minutes)?;
        validate_price(input.price)?;

        let tag_ids = self.resolve_owned(AttributeKind::Tag, owner_id, &input.tags).await?;
        let ingredient_ids = self
            .resolve_owned(AttributeKind::Ingredient, owner_id, &input.ingredients)
            .await?;

        let mut tx = self.pool.begin().await?;
        let recipe = sqlx::query_as::<_, Recipe>(
            "UPDATE recipe SET title = $1, time_minutes = $2, price = $3 \
             WHERE id = $4 AND user_id = $5 RETURNING *",
        )
        .bind(&title)
        .bind(input.time_minutes)
        .bind(input.price)
        .bind(recipe_id)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_links(&mut tx, AttributeKind::Tag, recipe.id, &tag_ids).await?;
        replace_links(&mut tx, AttributeKind::Ingredient, recipe.id, &ingredient_ids).await?;
        tx.commit().await?;

        Ok(RecipeShape::summary(&recipe, tag_ids, ingredient_ids))
    }

    /// Partial update: only supplied fields change
    pub async fn update_partial(
        &self,
        owner_id: i64,
        recipe_id: i64,
        patch: RecipePatch,
    ) -> Result<RecipeShape, ApiError> {
        let current = self.fetch_owned(owner_id, recipe_id).await?;

        let title = match &patch.title {
            Some(title) => validate_title(title)?,
            None => current.title.clone(),
        };
        let time_minutes = match patch.time_minutes {
            Some(time_minutes) => {
                validate_time_minutes(time_minutes)?;
                time_minutes
            }
            None => current.time_minutes,
        };
        let price = match patch.price {
            Some(price) => {
                validate_price(price)?;
                price
            }
            None => current.price,
        };

        let tag_ids = match &patch.tags {
            Some(ids) => Some(self.resolve_owned(AttributeKind::Tag, owner_id, ids).await?),
            None => None,
        };
        let ingredient_ids = match &patch.ingredients {
            Some(ids) => Some(
                self.resolve_owned(AttributeKind::Ingredient, owner_id, ids)
                    .await?,
            ),
            None => None,
        };

        let mut tx = self.pool.begin().await?;
        let recipe = sqlx::query_as::<_, Recipe>(
            "UPDATE recipe SET title = $1, time_minutes = $2, price = $3 \
             WHERE id = $4 AND user_id = $5 RETURNING *",
        )
        .bind(&title)
        .bind(time_minutes)
        .bind(price)
        .bind(recipe_id)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(ids) = &tag_ids {
            replace_links(&mut tx, AttributeKind::Tag, recipe.id, ids).await?;
        }
        if let Some(ids) = &ingredient_ids {
            replace_links(&mut tx, AttributeKind::Ingredient, recipe.id, ids).await?;
        }
        tx.commit().await?;

        let tag_ids = match tag_ids {
            Some(ids) => ids,
            None => self.load_link_ids_for(AttributeKind::Tag, recipe.id).await?,
        };
        let ingredient_ids = match ingredient_ids {
            Some(ids) => ids,
            None => {
                self.load_link_ids_for(AttributeKind::Ingredient, recipe.id)
                    .await?
            }
        };

        Ok(RecipeShape::summary(&recipe, tag_ids, ingredient_ids))
    }

    /// Delete a recipe the caller owns; join rows cascade
    pub async fn delete(&self, owner_id: i64, recipe_id: i64) -> Result<(), ApiError> {
        let recipe = self.fetch_owned(owner_id, recipe_id).await?;

        sqlx::query("DELETE FROM recipe WHERE id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if let Some(old) = &recipe.image_path {
            self.images.remove(old).await;
        }
        Ok(())
    }

    /// Attach an uploaded image to a recipe the caller owns, superseding any
    /// previous one. Validation happens before anything is written, so a bad
    /// payload leaves the existing image untouched.
    pub async fn attach_image(
        &self,
        owner_id: i64,
        recipe_id: i64,
        bytes: &[u8],
    ) -> Result<Recipe, ApiError> {
        let recipe = self.fetch_owned(owner_id, recipe_id).await?;
        let extension = ImageService::validate(bytes)?;

        let relative = self.images.store(bytes, extension).await?;
        let updated = sqlx::query_as::<_, Recipe>(
            "UPDATE recipe SET image_path = $1 WHERE id = $2 AND user_id = $3 RETURNING *",
        )
        .bind(&relative)
        .bind(recipe_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        if let Some(old) = &recipe.image_path {
            self.images.remove(old).await;
        }

        Ok(updated)
    }

    /// Owner-scoped fetch; an id owned by someone else reads as absent
    async fn fetch_owned(&self, owner_id: i64, recipe_id: i64) -> Result<Recipe, ApiError> {
        sqlx::query_as::<_, Recipe>("SELECT r.* FROM recipe r WHERE r.id = $1 AND r.user_id = $2")
            .bind(recipe_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Recipe not found"))
    }

    /// Resolve attribute ids against the caller's own rows. An id that does
    /// not resolve (nonexistent, or owned by another user) fails validation.
    async fn resolve_owned(
        &self,
        kind: AttributeKind,
        owner_id: i64,
        ids: &[i64],
    ) -> Result<Vec<i64>, ApiError> {
        let mut unique: Vec<i64> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }
        if unique.is_empty() {
            return Ok(unique);
        }

        let placeholders: Vec<String> = (0..unique.len()).map(|i| format!("${}", i + 2)).collect();
        let statement = format!(
            "SELECT a.id FROM {} a WHERE a.user_id = $1 AND a.id IN ({})",
            kind.table(),
            placeholders.join(", ")
        );
        let mut query = sqlx::query_scalar::<_, i64>(&statement).bind(owner_id);
        for id in &unique {
            query = query.bind(id);
        }
        let found = query.fetch_all(&self.pool).await?;

        if let Some(missing) = unique.iter().find(|id| !found.contains(id)) {
            return Err(ApiError::field_error(
                kind.param_name(),
                format!("Invalid pk \"{}\" - object does not exist.", missing),
            ));
        }
        Ok(unique)
    }

    /// Attribute id lists for a batch of recipes, keyed by recipe id
    async fn load_link_ids(
        &self,
        kind: AttributeKind,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<i64>>, ApiError> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders: Vec<String> = (0..recipe_ids.len()).map(|i| format!("${}", i + 1)).collect();
        let statement = format!(
            "SELECT j.recipe_id, j.{} FROM {} j WHERE j.recipe_id IN ({}) ORDER BY j.{}",
            kind.join_column(),
            kind.join_table(),
            placeholders.join(", "),
            kind.join_column()
        );
        let mut query = sqlx::query_as::<_, (i64, i64)>(&statement);
        for id in recipe_ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
        for (recipe_id, attribute_id) in rows {
            map.entry(recipe_id).or_default().push(attribute_id);
        }
        Ok(map)
    }

    async fn load_link_ids_for(&self, kind: AttributeKind, recipe_id: i64) -> Result<Vec<i64>, ApiError> {
        let statement = format!(
            "SELECT j.{} FROM {} j WHERE j.recipe_id = $1 ORDER BY j.{}",
            kind.join_column(),
            kind.join_table(),
            kind.join_column()
        );
        Ok(sqlx::query_scalar::<_, i64>(&statement)
            .bind(recipe_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn load_linked_attributes(
        &self,
        kind: AttributeKind,
        recipe_id: i64,
    ) -> Result<Vec<Attribute>, ApiError> {
        let statement = format!(
            "SELECT a.* FROM {} a JOIN {} j ON j.{} = a.id WHERE j.recipe_id = $1 ORDER BY a.id",
            kind.table(),
            kind.join_table(),
            kind.join_column()
        );
        Ok(sqlx::query_as::<_, Attribute>(&statement)
            .bind(recipe_id)
            .fetch_all(&self.pool)
            .await?)
    }
}

async fn insert_links(
    tx: &mut Transaction<'_, Postgres>,
    kind: AttributeKind,
    recipe_id: i64,
    attribute_ids: &[i64],
) -> Result<(), ApiError> {
    let statement = format!(
        "INSERT INTO {} (recipe_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        kind.join_table(),
        kind.join_column()
    );
    for attribute_id in attribute_ids {
        sqlx::query(&statement)
            .bind(recipe_id)
            .bind(attribute_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn replace_links(
    tx: &mut Transaction<'_, Postgres>,
    kind: AttributeKind,
    recipe_id: i64,
    attribute_ids: &[i64],
) -> Result<(), ApiError> {
    let statement = format!("DELETE FROM {} WHERE recipe_id = $1", kind.join_table());
    sqlx::query(&statement).bind(recipe_id).execute(&mut **tx).await?;
    insert_links(tx, kind, recipe_id, attribute_ids).await
}

fn validate_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::field_error("title", "This field may not be blank"));
    }
    Ok(title.to_string())
}

fn validate_time_minutes(time_minutes: i32) -> Result<(), ApiError> {
    if time_minutes < 0 {
        return Err(ApiError::field_error(
            "time_minutes",
            "Ensure this value is greater than or equal to 0",
        ));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), ApiError> {
    if price < Decimal::ZERO {
        return Err(ApiError::field_error(
            "price",
            "Ensure this value is greater than or equal to 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert_eq!(validate_title(" Chicken Tikka ").unwrap(), "Chicken Tikka");
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(validate_time_minutes(-1).is_err());
        assert!(validate_time_minutes(0).is_ok());
        assert!(validate_price(Decimal::new(-1, 2)).is_err());
        assert!(validate_price(Decimal::ZERO).is_ok());
    }

    #[test]
    fn recipe_input_defaults_to_empty_attribute_sets() {
        let input: RecipeInput = serde_json::from_value(serde_json::json!({
            "title": "Chocolate cheesecake",
            "time_minutes": 30,
            "price": 5.00
        }))
        .unwrap();
        assert!(input.tags.is_empty());
        assert!(input.ingredients.is_empty());
    }

    #[test]
    fn recipe_patch_distinguishes_absent_from_empty() {
        let patch: RecipePatch = serde_json::from_value(serde_json::json!({
            "title": "Chicken Tikka",
            "tags": []
        }))
        .unwrap();
        assert_eq!(patch.title.as_deref(), Some("Chicken Tikka"));
        assert_eq!(patch.tags, Some(vec![]));
        assert!(patch.ingredients.is_none());
    }
}
