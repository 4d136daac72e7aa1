use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::accounts::{self, ProfileChanges, UserExtras};
use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{Claims, encode_token};
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

pub async fn create(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateUserRequest>, AppError>,
) -> Result<(StatusCode, Json<User>), AppError> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let user = accounts::create_user(
        &state.pool,
        &req.email,
        &req.password,
        UserExtras {
            name: req.name,
            ..UserExtras::default()
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn token(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<TokenRequest>, AppError>,
) -> Result<Json<TokenResponse>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let email = accounts::normalize_email(&req.email);

    if let Err(retry_after) = state.login_limiter.check(&email) {
        return Err(AppError::RateLimited(format!(
            "Too many login attempts. Try again in {retry_after} seconds."
        )));
    }

    let Some(user) = accounts::authenticate(&state.pool, &email, &req.password).await? else {
        state.login_limiter.record_failure(&email);
        tracing::info!("Failed token request for {email}");
        return Err(AppError::BadRequest(
            "Unable to authenticate with provided credentials".to_string(),
        ));
    };
    state.login_limiter.reset(&email);

    let claims =
        Claims::new(user.id, state.config.token_ttl_minutes).map_err(AppError::Internal)?;
    let token = encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    Ok(Json(TokenResponse { token }))
}

pub async fn me(auth: AuthUser, State(state): State<SharedState>) -> Result<Json<User>, AppError> {
    let user = current_user(&state, &auth).await?;
    Ok(Json(user))
}

/// PATCH: only the supplied fields change.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateMeRequest>, AppError>,
) -> Result<Json<User>, AppError> {
    if let Some(email) = &req.email {
        validate_email(email)?;
    }
    if let Some(password) = &req.password {
        validate_password(password)?;
    }

    let user = current_user(&state, &auth).await?;
    let updated = accounts::update_profile(
        &state.pool,
        &user,
        ProfileChanges {
            email: req.email,
            name: req.name,
            password: req.password,
        },
    )
    .await?;

    Ok(Json(updated))
}

/// PUT: email, password and name are all required.
pub async fn replace_me(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateMeRequest>, AppError>,
) -> Result<Json<User>, AppError> {
    let (Some(email), Some(password), Some(name)) = (req.email, req.password, req.name) else {
        return Err(AppError::BadRequest(
            "email, password and name are required".to_string(),
        ));
    };
    validate_email(&email)?;
    validate_password(&password)?;

    let user = current_user(&state, &auth).await?;
    let updated = accounts::update_profile(
        &state.pool,
        &user,
        ProfileChanges {
            email: Some(email),
            name: Some(name),
            password: Some(password),
        },
    )
    .await?;

    Ok(Json(updated))
}

async fn current_user(state: &SharedState, auth: &AuthUser) -> Result<User, AppError> {
    db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    if !accounts::is_valid_email(email) {
        return Err(AppError::BadRequest(
            "Enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
