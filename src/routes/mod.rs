pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::SharedState;

const MAX_NAME_LEN: usize = 255;

pub fn api_routes(max_upload_size: usize) -> Router<SharedState> {
    Router::new()
        // Users
        .route("/api/user/create/", post(users::create))
        .route("/api/user/token/", post(users::token))
        .route(
            "/api/user/me/",
            get(users::me).put(users::replace_me).patch(users::update_me),
        )
        // Recipes
        .route(
            "/api/recipe/recipes/",
            get(recipes::list).post(recipes::create),
        )
        .route(
            "/api/recipe/recipes/{id}/",
            get(recipes::get)
                .put(recipes::update)
                .patch(recipes::patch)
                .delete(recipes::delete),
        )
        .route(
            "/api/recipe/recipes/{id}/upload-image/",
            post(recipes::upload_image).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Tags
        .route("/api/recipe/tags/", get(tags::list).post(tags::create))
        .route(
            "/api/recipe/tags/{id}/",
            get(tags::get)
                .put(tags::update)
                .patch(tags::patch)
                .delete(tags::delete),
        )
        // Ingredients
        .route(
            "/api/recipe/ingredients/",
            get(ingredients::list).post(ingredients::create),
        )
        .route(
            "/api/recipe/ingredients/{id}/",
            get(ingredients::get)
                .put(ingredients::update)
                .patch(ingredients::patch)
                .delete(ingredients::delete),
        )
}

/// Query string shared by the tag and ingredient lists.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub assigned_only: Option<u8>,
}

impl ListParams {
    pub fn assigned_only(&self) -> bool {
        self.assigned_only.is_some_and(|v| v != 0)
    }
}

/// Body for tag and ingredient writes.
#[derive(Debug, Default, Deserialize)]
pub struct NamePayload {
    pub name: Option<String>,
}

impl NamePayload {
    pub fn required_name(self) -> Result<String, AppError> {
        self.optional_name()?
            .ok_or_else(|| AppError::BadRequest("Name is required".to_string()))
    }

    pub fn optional_name(self) -> Result<Option<String>, AppError> {
        let Some(name) = self.name else {
            return Ok(None);
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name may not be blank".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::BadRequest(format!(
                "Name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        Ok(Some(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed_and_required() {
        let payload = NamePayload {
            name: Some("  Vegan ".to_string()),
        };
        assert_eq!(payload.required_name().unwrap(), "Vegan");

        assert!(NamePayload { name: None }.required_name().is_err());
        assert!(
            NamePayload {
                name: Some("   ".to_string())
            }
            .required_name()
            .is_err()
        );
    }

    #[test]
    fn absent_name_is_allowed_for_patch() {
        assert_eq!(NamePayload { name: None }.optional_name().unwrap(), None);
    }

    #[test]
    fn assigned_only_flag() {
        assert!(!ListParams::default().assigned_only());
        assert!(ListParams { assigned_only: Some(1) }.assigned_only());
        assert!(!ListParams { assigned_only: Some(0) }.assigned_only());
    }
}
