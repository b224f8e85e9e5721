pub mod attribute;
pub mod recipe;
pub mod user;

pub use attribute::{Attribute, AttributeKind};
pub use recipe::Recipe;
pub use user::User;
