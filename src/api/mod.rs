pub mod shapes;

pub use shapes::{AttributeShape, RecipeDetail, RecipeShape, RecipeSummary};
