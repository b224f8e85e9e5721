pub mod attribute_filter;
pub mod error;
pub mod recipe_filter;
pub mod types;

pub use attribute_filter::AttributeFilter;
pub use error::FilterError;
pub use recipe_filter::{parse_id_list, RecipeFilter};
pub use types::SqlResult;
