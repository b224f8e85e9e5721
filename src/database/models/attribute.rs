use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The two owner-scoped recipe attribute entities. Structurally identical,
/// stored in distinct tables, never addressed by a runtime string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 2] = [AttributeKind::Tag, AttributeKind::Ingredient];

    /// Table holding the attribute rows
    pub fn table(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tag",
            AttributeKind::Ingredient => "ingredient",
        }
    }

    /// Join table linking recipes to this attribute
    pub fn join_table(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "recipe_tag",
            AttributeKind::Ingredient => "recipe_ingredient",
        }
    }

    /// Column of the join table referencing the attribute row
    pub fn join_column(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tag_id",
            AttributeKind::Ingredient => "ingredient_id",
        }
    }

    /// Request parameter this dimension is filtered by
    pub fn param_name(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tags",
            AttributeKind::Ingredient => "ingredients",
        }
    }
}

/// A Tag or Ingredient row; which one is fixed by the query that loaded it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attribute {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_tables() {
        assert_eq!(AttributeKind::Tag.table(), "tag");
        assert_eq!(AttributeKind::Ingredient.table(), "ingredient");
        assert_ne!(
            AttributeKind::Tag.join_table(),
            AttributeKind::Ingredient.join_table()
        );
    }
}
