use sqlx::PgConnection;

use crate::db;
use crate::db::recipes::RecipeFilter;
use crate::error::AppError;
use crate::media::{self, decode};
use crate::models::{Recipe, RecipeDetail, RecipeImage, RecipeSummary, media_file_url};
use crate::recipe::payload::{RecipePayload, RecipeWrite};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Recipe not found".to_string())
}

pub async fn list(
    state: &AppState,
    owner: i64,
    filter: &RecipeFilter,
) -> Result<Vec<RecipeSummary>, AppError> {
    Ok(db::recipes::list(&state.pool, owner, filter).await?)
}

pub async fn retrieve(state: &AppState, owner: i64, id: i64) -> Result<RecipeDetail, AppError> {
    let mut conn = state.pool.acquire().await?;
    let recipe = db::recipes::find_by_id(&mut *conn, id, owner)
        .await?
        .ok_or_else(not_found)?;
    load_detail(&mut *conn, recipe, &state.config.media_url()).await
}

pub async fn create(
    state: &AppState,
    owner: i64,
    payload: RecipePayload,
) -> Result<RecipeDetail, AppError> {
    let write = payload.into_full()?;

    let mut tx = state.pool.begin().await?;
    let recipe = db::recipes::insert(&mut *tx, owner, &write.fields).await?;
    write_relations(&mut *tx, owner, recipe.id, &write).await?;
    let detail = load_detail(&mut *tx, recipe, &state.config.media_url()).await?;
    tx.commit().await?;

    tracing::debug!(recipe_id = detail.id, owner, "Recipe created");
    Ok(detail)
}

/// PUT semantics: relations missing from the payload are cleared.
pub async fn update_full(
    state: &AppState,
    owner: i64,
    id: i64,
    payload: RecipePayload,
) -> Result<RecipeDetail, AppError> {
    let write = payload.into_full()?;

    let mut tx = state.pool.begin().await?;
    db::recipes::find_for_update(&mut *tx, id, owner)
        .await?
        .ok_or_else(not_found)?;
    let detail = apply(&mut *tx, state, owner, id, &write).await?;
    tx.commit().await?;
    Ok(detail)
}

/// PATCH semantics: only the keys present in the payload change.
pub async fn update_partial(
    state: &AppState,
    owner: i64,
    id: i64,
    payload: RecipePayload,
) -> Result<RecipeDetail, AppError> {
    let mut tx = state.pool.begin().await?;
    let current = db::recipes::find_for_update(&mut *tx, id, owner)
        .await?
        .ok_or_else(not_found)?;
    let write = payload.into_partial(&current)?;
    let detail = apply(&mut *tx, state, owner, id, &write).await?;
    tx.commit().await?;
    Ok(detail)
}

/// Attach an uploaded image. The recipe's previous image, if any, is released
/// once the new one is committed.
pub async fn upload_image(
    state: &AppState,
    owner: i64,
    id: i64,
    data: bytes::Bytes,
) -> Result<RecipeImage, AppError> {
    db::recipes::find_by_id(&state.pool, id, owner)
        .await?
        .ok_or_else(not_found)?;

    let decoded = data.clone();
    let extension = tokio::task::spawn_blocking(move || decode::validate_image(&decoded))
        .await
        .map_err(|e| AppError::Internal(format!("Image validation task failed: {e}")))?
        .map_err(AppError::BadRequest)?;

    let mut tx = state.pool.begin().await?;
    let current = db::recipes::find_for_update(&mut *tx, id, owner)
        .await?
        .ok_or_else(not_found)?;

    let path = media::recipe_image_path(extension);
    state.media.save(&path, &data).await?;

    let recipe = match db::recipes::set_image(&mut *tx, id, owner, &path).await {
        Ok(recipe) => recipe,
        Err(e) => {
            media::release(state.media.as_ref(), &path).await;
            return Err(e.into());
        }
    };
    if let Err(e) = tx.commit().await {
        media::release(state.media.as_ref(), &path).await;
        return Err(e.into());
    }

    if let Some(previous) = current.image.filter(|p| *p != path) {
        media::release(state.media.as_ref(), &previous).await;
    }

    tracing::debug!(recipe_id = id, owner, "Recipe image stored at {path}");
    Ok(RecipeImage {
        id: recipe.id,
        image: media_file_url(&state.config.media_url(), &path),
    })
}

/// Delete a recipe and release its stored image.
pub async fn delete(state: &AppState, owner: i64, id: i64) -> Result<(), AppError> {
    let image = db::recipes::delete(&state.pool, id, owner)
        .await?
        .ok_or_else(not_found)?;

    if let Some(path) = image {
        media::release(state.media.as_ref(), &path).await;
    }

    tracing::debug!(recipe_id = id, owner, "Recipe deleted");
    Ok(())
}

async fn apply(
    conn: &mut PgConnection,
    state: &AppState,
    owner: i64,
    id: i64,
    write: &RecipeWrite,
) -> Result<RecipeDetail, AppError> {
    let recipe = db::recipes::update(&mut *conn, id, owner, &write.fields).await?;
    write_relations(&mut *conn, owner, id, write).await?;
    load_detail(conn, recipe, &state.config.media_url()).await
}

/// Replace the relation sets present in `write`, refusing ids the owner does not own.
async fn write_relations(
    conn: &mut PgConnection,
    owner: i64,
    recipe_id: i64,
    write: &RecipeWrite,
) -> Result<(), AppError> {
    if let Some(tags) = &write.tags {
        let owned = db::tags::owned_ids(&mut *conn, owner, tags).await?;
        ensure_owned("tag", tags, &owned)?;
        db::recipes::set_tags(&mut *conn, recipe_id, tags).await?;
    }

    if let Some(ingredients) = &write.ingredients {
        let owned = db::ingredients::owned_ids(&mut *conn, owner, ingredients).await?;
        ensure_owned("ingredient", ingredients, &owned)?;
        db::recipes::set_ingredients(&mut *conn, recipe_id, ingredients).await?;
    }

    Ok(())
}

fn ensure_owned(kind: &str, requested: &[i64], owned: &[i64]) -> Result<(), AppError> {
    let missing: Vec<String> = requested
        .iter()
        .filter(|id| !owned.contains(*id))
        .map(|id| id.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid {kind} id(s): {}",
            missing.join(", ")
        )))
    }
}

async fn load_detail(
    conn: &mut PgConnection,
    recipe: Recipe,
    media_url: &str,
) -> Result<RecipeDetail, AppError> {
    let tags = db::tags::list_for_recipe(&mut *conn, recipe.id).await?;
    let ingredients = db::ingredients::list_for_recipe(&mut *conn, recipe.id).await?;
    Ok(RecipeDetail::new(recipe, tags, ingredients, media_url))
}
