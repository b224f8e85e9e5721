use sqlx::PgPool;

use crate::database::models::{Attribute, AttributeKind};
use crate::error::ApiError;
use crate::filter::AttributeFilter;

/// Owner-scoped access to one attribute dimension (tags or ingredients).
/// The dimension is fixed at construction; there is no cross-user path.
pub struct AttributeService {
    pool: PgPool,
    kind: AttributeKind,
}

impl AttributeService {
    pub fn new(pool: PgPool, kind: AttributeKind) -> Self {
        Self { pool, kind }
    }

    /// List the caller's attributes, name descending. With `assigned_only`,
    /// restrict to attributes referenced by at least one recipe.
    pub async fn list(&self, owner_id: i64, assigned_only: bool) -> Result<Vec<Attribute>, ApiError> {
        let sql = AttributeFilter::new(owner_id)
            .assigned_only(assigned_only)
            .to_sql(self.kind);

        let mut query = sqlx::query_as::<_, Attribute>(&sql.query);
        for param in sql.params {
            query = query.bind(param);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Create an attribute owned by the caller. Blank names are rejected;
    /// duplicate names per user are allowed.
    pub async fn create(&self, owner_id: i64, name: &str) -> Result<Attribute, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::field_error("name", "This field may not be blank"));
        }

        let statement = format!(
            "INSERT INTO {} (name, user_id) VALUES ($1, $2) RETURNING *",
            self.kind.table()
        );
        let attribute = sqlx::query_as::<_, Attribute>(&statement)
            .bind(name)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(attribute)
    }
}
