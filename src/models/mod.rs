mod ingredient;
mod recipe;
mod tag;
mod user;

pub use ingredient::Ingredient;
pub use recipe::{Recipe, RecipeDetail, RecipeImage, RecipeSummary, media_file_url};
pub use tag::Tag;
pub use user::User;
