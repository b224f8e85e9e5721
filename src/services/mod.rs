pub mod attribute_service;
pub mod image_service;
pub mod recipe_service;
pub mod user_service;

pub use attribute_service::AttributeService;
pub use image_service::ImageService;
pub use recipe_service::{RecipeInput, RecipePatch, RecipeService};
pub use user_service::{LoginInput, RegisterInput, Session, UserService};
