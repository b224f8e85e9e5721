use crate::database::models::AttributeKind;

use super::types::SqlResult;

/// Owner-scoped attribute listing, optionally restricted to attributes that
/// are assigned to at least one recipe.
pub struct AttributeFilter {
    owner_id: i64,
    assigned_only: bool,
}

impl AttributeFilter {
    pub fn new(owner_id: i64) -> Self {
        Self {
            owner_id,
            assigned_only: false,
        }
    }

    pub fn assigned_only(mut self, assigned_only: bool) -> Self {
        self.assigned_only = assigned_only;
        self
    }

    /// Render as a parameterized SELECT over the dimension's table, ordered
    /// by name descending with insertion order breaking ties.
    ///
    /// The assigned-only restriction is a set-membership test against the
    /// join table and deliberately matches usage by any recipe, not just the
    /// caller's own.
    pub fn to_sql(&self, kind: AttributeKind) -> SqlResult {
        let mut conditions = vec!["a.user_id = $1".to_string()];
        if self.assigned_only {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM {} j WHERE j.{} = a.id)",
                kind.join_table(),
                kind.join_column()
            ));
        }

        let query = format!(
            "SELECT a.* FROM {} a WHERE {} ORDER BY a.name DESC, a.id ASC",
            kind.table(),
            conditions.join(" AND ")
        );
        SqlResult {
            query,
            params: vec![self.owner_id],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_owner_scoped_and_name_desc() {
        let sql = AttributeFilter::new(3).to_sql(AttributeKind::Tag);
        assert_eq!(
            sql.query,
            "SELECT a.* FROM tag a WHERE a.user_id = $1 ORDER BY a.name DESC, a.id ASC"
        );
        assert_eq!(sql.params, vec![3]);
    }

    #[test]
    fn assigned_only_adds_membership_test() {
        let sql = AttributeFilter::new(3)
            .assigned_only(true)
            .to_sql(AttributeKind::Ingredient);
        assert!(sql.query.contains(
            "EXISTS (SELECT 1 FROM recipe_ingredient j WHERE j.ingredient_id = a.id)"
        ));
        assert!(sql.query.starts_with("SELECT a.* FROM ingredient a WHERE a.user_id = $1"));
    }
}
