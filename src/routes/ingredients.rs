use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum_extra::extract::WithRejection;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Ingredient;
use crate::routes::{ListParams, NamePayload};
use crate::state::SharedState;

fn not_found() -> AppError {
    AppError::NotFound("Ingredient not found".to_string())
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, AppError>,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    let ingredients = db::ingredients::list(&state.pool, auth.owner(), params.assigned_only()).await?;
    Ok(Json(ingredients))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<NamePayload>, AppError>,
) -> Result<(StatusCode, Json<Ingredient>), AppError> {
    let name = req.required_name()?;
    let ingredient = db::ingredients::create(&state.pool, auth.owner(), &name).await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Ingredient>, AppError> {
    let ingredient = db::ingredients::find_by_id(&state.pool, id, auth.owner())
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(ingredient))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<NamePayload>, AppError>,
) -> Result<Json<Ingredient>, AppError> {
    let name = req.required_name()?;
    let ingredient = db::ingredients::update(&state.pool, id, auth.owner(), &name)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(ingredient))
}

pub async fn patch(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<NamePayload>, AppError>,
) -> Result<Json<Ingredient>, AppError> {
    let ingredient = match req.optional_name()? {
        Some(name) => db::ingredients::update(&state.pool, id, auth.owner(), &name).await?,
        None => db::ingredients::find_by_id(&state.pool, id, auth.owner()).await?,
    }
    .ok_or_else(not_found)?;
    Ok(Json(ingredient))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    if !db::ingredients::delete(&state.pool, id, auth.owner()).await? {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
