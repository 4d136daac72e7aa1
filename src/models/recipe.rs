use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::{Ingredient, Tag};

/// A row of the `recipes` table. Never serialized directly; handlers render
/// either [`RecipeSummary`] or [`RecipeDetail`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    /// Storage-relative path of the uploaded image.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List shape: related tags and ingredients as ids only.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    #[serde(serialize_with = "serialize_price")]
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}

/// Detail shape: related tags and ingredients expanded, image as a public URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    #[serde(serialize_with = "serialize_price")]
    pub price: Decimal,
    pub link: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl RecipeDetail {
    pub fn new(recipe: Recipe, tags: Vec<Tag>, ingredients: Vec<Ingredient>, media_url: &str) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            image: recipe.image.map(|path| media_file_url(media_url, &path)),
            tags,
            ingredients,
        }
    }
}

/// Response of the image upload action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeImage {
    pub id: i64,
    pub image: String,
}

/// Prices always render with two decimal places, `0` included.
fn serialize_price<S: Serializer>(price: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    let mut price = *price;
    price.rescale(2);
    serializer.collect_str(&price)
}

pub fn media_file_url(media_url: &str, path: &str) -> String {
    format!("{}/{}", media_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(image: Option<&str>) -> Recipe {
        Recipe {
            id: 7,
            user_id: 1,
            title: "Sample recipe".to_string(),
            time_minutes: 10,
            price: Decimal::new(500, 2),
            link: None,
            image: image.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn detail_renders_image_url() {
        let detail = RecipeDetail::new(
            recipe(Some("uploads/recipe/abc.jpg")),
            vec![],
            vec![],
            "http://localhost:3000/media/",
        );
        assert_eq!(
            detail.image.as_deref(),
            Some("http://localhost:3000/media/uploads/recipe/abc.jpg")
        );
    }

    #[test]
    fn detail_serializes_nested_relations_and_hides_owner() {
        let tag = Tag {
            id: 3,
            user_id: 1,
            name: "Vegan".to_string(),
        };
        let detail = RecipeDetail::new(recipe(None), vec![tag], vec![], "/media");
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["price"], "5.00");
        assert_eq!(json["image"], serde_json::Value::Null);
        assert_eq!(json["tags"][0], serde_json::json!({ "id": 3, "name": "Vegan" }));
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn zero_price_keeps_two_decimal_places() {
        let mut row = recipe(None);
        row.price = Decimal::ZERO;
        let json = serde_json::to_value(RecipeDetail::new(row, vec![], vec![], "/media")).unwrap();
        assert_eq!(json["price"], "0.00");

        let summary = RecipeSummary {
            id: 1,
            title: "Water".to_string(),
            time_minutes: 0,
            price: Decimal::new(5, 1),
            link: None,
            tags: vec![],
            ingredients: vec![],
        };
        assert_eq!(serde_json::to_value(&summary).unwrap()["price"], "0.50");
    }
}
