/// A parameterized SQL statement ready to bind and execute.
/// Placeholders are numbered `$1..$n` in `params` order.
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<i64>,
}
