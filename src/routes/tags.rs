use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum_extra::extract::WithRejection;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Tag;
use crate::routes::{ListParams, NamePayload};
use crate::state::SharedState;

fn not_found() -> AppError {
    AppError::NotFound("Tag not found".to_string())
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, AppError>,
) -> Result<Json<Vec<Tag>>, AppError> {
    let tags = db::tags::list(&state.pool, auth.owner(), params.assigned_only()).await?;
    Ok(Json(tags))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<NamePayload>, AppError>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let name = req.required_name()?;
    let tag = db::tags::create(&state.pool, auth.owner(), &name).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Tag>, AppError> {
    let tag = db::tags::find_by_id(&state.pool, id, auth.owner())
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(tag))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<NamePayload>, AppError>,
) -> Result<Json<Tag>, AppError> {
    let name = req.required_name()?;
    let tag = db::tags::update(&state.pool, id, auth.owner(), &name)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(tag))
}

pub async fn patch(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<NamePayload>, AppError>,
) -> Result<Json<Tag>, AppError> {
    let tag = match req.optional_name()? {
        Some(name) => db::tags::update(&state.pool, id, auth.owner(), &name).await?,
        None => db::tags::find_by_id(&state.pool, id, auth.owner()).await?,
    }
    .ok_or_else(not_found)?;
    Ok(Json(tag))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    if !db::tags::delete(&state.pool, id, auth.owner()).await? {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
