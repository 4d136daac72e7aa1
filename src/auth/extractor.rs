use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

/// The authenticated caller. Every scoped store call takes its `user_id` as the owner.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
}

impl AuthUser {
    pub fn owner(&self) -> i64 {
        self.user_id
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .or_else(|| auth_str.strip_prefix("Token "))
            .ok_or_else(|| AppError::Unauthorized("Unsupported authorization scheme".to_string()))?;

        let claims = jwt::decode_token(token.trim(), &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        // The account must still exist and be active.
        let user = db::users::find_by_id(&state.pool, claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized("User inactive or deleted".to_string()))?;

        Ok(AuthUser { user_id: user.id })
    }
}
