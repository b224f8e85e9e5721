// Public wire shapes for recipe resources.
//
// Recipes are rendered in exactly two shapes: the summary shape used by list
// and write responses (nested attributes as bare ids) and the detail shape
// used by single-resource retrieval (nested attributes expanded to objects).
// The shape is chosen explicitly by the call site, never inferred from the
// operation name.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config;
use crate::database::models::{Attribute, Recipe};

/// Attribute rendered as an expanded object: `{id, name}`.
/// Also the response shape of the tag/ingredient endpoints themselves.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttributeShape {
    pub id: i64,
    pub name: String,
}

impl From<&Attribute> for AttributeShape {
    fn from(attribute: &Attribute) -> Self {
        Self {
            id: attribute.id,
            name: attribute.name.clone(),
        }
    }
}

/// List-shape recipe: nested collections as bare identifiers
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
    pub image: Option<String>,
}

/// Detail-shape recipe: nested collections as expanded objects
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub tags: Vec<AttributeShape>,
    pub ingredients: Vec<AttributeShape>,
    pub image: Option<String>,
}

/// The two serialization contracts for a recipe, selected by the call site
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RecipeShape {
    Summary(RecipeSummary),
    Detail(RecipeDetail),
}

impl RecipeShape {
    pub fn summary(recipe: &Recipe, tag_ids: Vec<i64>, ingredient_ids: Vec<i64>) -> Self {
        RecipeShape::Summary(RecipeSummary {
            id: recipe.id,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            tags: tag_ids,
            ingredients: ingredient_ids,
            image: image_url(recipe),
        })
    }

    pub fn detail(recipe: &Recipe, tags: &[Attribute], ingredients: &[Attribute]) -> Self {
        RecipeShape::Detail(RecipeDetail {
            id: recipe.id,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            tags: tags.iter().map(AttributeShape::from).collect(),
            ingredients: ingredients.iter().map(AttributeShape::from).collect(),
            image: image_url(recipe),
        })
    }
}

/// Public URL for a recipe's attached image, if any
pub fn image_url(recipe: &Recipe) -> Option<String> {
    recipe
        .image_path
        .as_ref()
        .map(|path| format!("{}/{}", config::config().media.base_url, path))
}
