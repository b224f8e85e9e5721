use crate::database::models::AttributeKind;

use super::error::FilterError;
use super::types::SqlResult;

/// Owner-scoped recipe query with optional attribute-membership restrictions.
///
/// The owner predicate is fixed at construction and always emitted; filter
/// parameters can only narrow the result set, never widen it past the caller's
/// own rows.
#[derive(Debug)]
pub struct RecipeFilter {
    owner_id: i64,
    dimensions: Vec<(AttributeKind, Vec<i64>)>,
}

impl RecipeFilter {
    pub fn new(owner_id: i64) -> Self {
        Self {
            owner_id,
            dimensions: vec![],
        }
    }

    /// Build a filter from the raw request parameters. Each parameter is a
    /// comma-separated list of integer ids; a malformed token fails the whole
    /// request rather than being skipped. Absent or empty parameters place no
    /// restriction on that dimension.
    pub fn parse(
        owner_id: i64,
        tags: Option<&str>,
        ingredients: Option<&str>,
    ) -> Result<Self, FilterError> {
        let mut filter = Self::new(owner_id);
        for kind in AttributeKind::ALL {
            let raw = match kind {
                AttributeKind::Tag => tags,
                AttributeKind::Ingredient => ingredients,
            };
            if let Some(raw) = raw {
                if let Some(ids) = parse_id_list(kind.param_name(), raw)? {
                    filter.restrict(kind, ids);
                }
            }
        }
        Ok(filter)
    }

    /// Restrict results to recipes whose attribute set intersects `ids`
    pub fn restrict(&mut self, kind: AttributeKind, ids: Vec<i64>) -> &mut Self {
        if !ids.is_empty() {
            self.dimensions.push((kind, ids));
        }
        self
    }

    /// Render the filter as a parameterized SELECT, newest recipe first
    pub fn to_sql(&self) -> SqlResult {
        let mut params: Vec<i64> = vec![self.owner_id];
        let mut conditions = vec!["r.user_id = $1".to_string()];

        for (kind, ids) in &self.dimensions {
            conditions.push(exists_predicate(*kind, ids, &mut params));
        }

        let query = format!(
            "SELECT r.* FROM recipe r WHERE {} ORDER BY r.id DESC",
            conditions.join(" AND ")
        );
        SqlResult { query, params }
    }
}

/// Membership predicate for one filter dimension. Any-match semantics: the
/// recipe survives when at least one of its linked attributes is in `ids`.
fn exists_predicate(kind: AttributeKind, ids: &[i64], params: &mut Vec<i64>) -> String {
    let mut placeholders = Vec::with_capacity(ids.len());
    for id in ids {
        params.push(*id);
        placeholders.push(format!("${}", params.len()));
    }
    format!(
        "EXISTS (SELECT 1 FROM {} j WHERE j.recipe_id = r.id AND j.{} IN ({}))",
        kind.join_table(),
        kind.join_column(),
        placeholders.join(", ")
    )
}

/// Parse a comma-separated integer list. `Ok(None)` for an empty literal,
/// `Err` on the first non-numeric token.
pub fn parse_id_list(param: &str, raw: &str) -> Result<Option<Vec<i64>>, FilterError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let mut ids = Vec::new();
    for token in raw.split(',') {
        let id = token
            .trim()
            .parse::<i64>()
            .map_err(|_| FilterError::InvalidIdList {
                param: param.to_string(),
                token: token.to_string(),
            })?;
        ids.push(id);
    }
    Ok(Some(ids))
}
