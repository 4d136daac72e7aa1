use serde::Deserialize;

use crate::db::recipes::RecipeFilter;
use crate::error::AppError;

/// Query string of the recipe list, e.g. `?tags=1,2&ingredients=3`.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListParams {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

impl RecipeListParams {
    pub fn into_filter(self) -> Result<RecipeFilter, AppError> {
        Ok(RecipeFilter {
            tags: parse_ids("tags", self.tags.as_deref())?,
            ingredients: parse_ids("ingredients", self.ingredients.as_deref())?,
        })
    }
}

/// Comma-separated ids. An empty parameter means no restriction.
fn parse_ids(param: &str, raw: Option<&str>) -> Result<Option<Vec<i64>>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("Invalid id '{s}' in '{param}' filter")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(if ids.is_empty() { None } else { Some(ids) })
}
