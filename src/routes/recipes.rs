use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum_extra::extract::WithRejection;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::{RecipeDetail, RecipeImage, RecipeSummary};
use crate::recipe::filter::RecipeListParams;
use crate::recipe::payload::RecipePayload;
use crate::recipe::store;
use crate::state::SharedState;
use crate::upload;

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Query(params), _): WithRejection<Query<RecipeListParams>, AppError>,
) -> Result<Json<Vec<RecipeSummary>>, AppError> {
    let filter = params.into_filter()?;
    let recipes = store::list(&state, auth.owner(), &filter).await?;
    Ok(Json(recipes))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<RecipePayload>, AppError>,
) -> Result<(StatusCode, Json<RecipeDetail>), AppError> {
    let recipe = store::create(&state, auth.owner(), req).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<RecipeDetail>, AppError> {
    let recipe = store::retrieve(&state, auth.owner(), id).await?;
    Ok(Json(recipe))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<RecipePayload>, AppError>,
) -> Result<Json<RecipeDetail>, AppError> {
    let recipe = store::update_full(&state, auth.owner(), id, req).await?;
    Ok(Json(recipe))
}

pub async fn patch(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<RecipePayload>, AppError>,
) -> Result<Json<RecipeDetail>, AppError> {
    let recipe = store::update_partial(&state, auth.owner(), id, req).await?;
    Ok(Json(recipe))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    store::delete(&state, auth.owner(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Multipart upload; the file goes in the `image` field.
pub async fn upload_image(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RecipeImage>, AppError> {
    let data = upload::read_field(&headers, body, "image")
        .await
        .map_err(AppError::BadRequest)?
        .filter(|data| !data.is_empty())
        .ok_or_else(|| AppError::BadRequest("No image was submitted".to_string()))?;

    let image = store::upload_image(&state, auth.owner(), id, data).await?;
    Ok(Json(image))
}
