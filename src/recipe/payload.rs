use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::error::AppError;
use crate::models::Recipe;

const MAX_TEXT_LEN: usize = 255;

/// Scalar columns of a recipe, validated and ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeFields {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
}

/// A resolved write. `None` relations are left as they are.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeWrite {
    pub fields: RecipeFields,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

/// Request body for create, full and partial update. Unknown keys, including
/// any owner or id sent by the client, are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePayload {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    /// Outer `None`: key absent. `Some(None)`: explicit null.
    #[serde(default, deserialize_with = "present")]
    pub link: Option<Option<String>>,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl RecipePayload {
    /// Create and full update: scalars are required, an absent link is cleared
    /// and absent relations become empty.
    pub fn into_full(self) -> Result<RecipeWrite, AppError> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.time_minutes.is_none() {
            missing.push("time_minutes");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        let (Some(title), Some(time_minutes), Some(price)) =
            (self.title, self.time_minutes, self.price)
        else {
            return Err(AppError::BadRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        Ok(RecipeWrite {
            fields: validate_fields(title, time_minutes, price, self.link.flatten())?,
            tags: Some(dedup(self.tags.unwrap_or_default())),
            ingredients: Some(dedup(self.ingredients.unwrap_or_default())),
        })
    }

    /// Partial update: every absent key keeps the value `current` holds.
    pub fn into_partial(self, current: &Recipe) -> Result<RecipeWrite, AppError> {
        let title = self.title.unwrap_or_else(|| current.title.clone());
        let time_minutes = self.time_minutes.unwrap_or(current.time_minutes);
        let price = self.price.unwrap_or(current.price);
        let link = match self.link {
            Some(link) => link,
            None => current.link.clone(),
        };

        Ok(RecipeWrite {
            fields: validate_fields(title, time_minutes, price, link)?,
            tags: self.tags.map(dedup),
            ingredients: self.ingredients.map(dedup),
        })
    }
}

fn validate_fields(
    title: String,
    time_minutes: i32,
    price: Decimal,
    link: Option<String>,
) -> Result<RecipeFields, AppError> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title may not be blank".to_string()));
    }
    if title.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::BadRequest(format!(
            "Title must be at most {MAX_TEXT_LEN} characters"
        )));
    }

    if time_minutes < 0 {
        return Err(AppError::BadRequest(
            "time_minutes must be zero or greater".to_string(),
        ));
    }

    // NUMERIC(5, 2)
    let price = price.normalize();
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::BadRequest(
            "Price must be zero or greater".to_string(),
        ));
    }
    if price.scale() > 2 {
        return Err(AppError::BadRequest(
            "Price must have at most 2 decimal places".to_string(),
        ));
    }
    if price >= Decimal::new(1000, 0) {
        return Err(AppError::BadRequest(
            "Price must be less than 1000".to_string(),
        ));
    }

    let link = link
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    if link.as_ref().is_some_and(|l| l.chars().count() > MAX_TEXT_LEN) {
        return Err(AppError::BadRequest(format!(
            "Link must be at most {MAX_TEXT_LEN} characters"
        )));
    }

    Ok(RecipeFields {
        title,
        time_minutes,
        price,
        link,
    })
}

fn dedup(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
