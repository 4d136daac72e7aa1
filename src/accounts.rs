//! Account creation and credential checks.
//!
//! Emails are stored trimmed and lower-cased, so `Alex@Example.COM` and
//! `alex@example.com` name the same account.

use sqlx::PgPool;

use crate::auth::password;
use crate::config::SuperuserConfig;
use crate::db;
use crate::db::users::NewUser;
use crate::error::AppError;
use crate::models::User;

/// Optional attributes for a new account.
#[derive(Debug, Clone)]
pub struct UserExtras {
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Default for UserExtras {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check applied to emails submitted through the API.
pub fn is_valid_email(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    extras: UserExtras,
) -> Result<User, AppError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AppError::BadRequest(
            "Users must have an email address".to_string(),
        ));
    }

    let password_hash = password::hash(password).map_err(AppError::Internal)?;

    let user = db::users::create(
        pool,
        &NewUser {
            email: &email,
            password_hash: &password_hash,
            name: extras.name.trim(),
            is_active: extras.is_active,
            is_staff: extras.is_staff,
            is_superuser: extras.is_superuser,
        },
    )
    .await
    .map_err(duplicate_email)?;

    tracing::info!(user_id = user.id, "User account created");
    Ok(user)
}

pub async fn create_superuser(pool: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
    create_user(
        pool,
        email,
        password,
        UserExtras {
            is_staff: true,
            is_superuser: true,
            ..UserExtras::default()
        },
    )
    .await
}

/// Returns the user when the credentials match an active account.
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let Some(user) = db::users::find_by_email(pool, &normalize_email(email)).await? else {
        return Ok(None);
    };

    let valid = password::verify(password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid || !user.is_active {
        return Ok(None);
    }

    Ok(Some(user))
}

/// Changes to a user's own profile; `None` leaves a field as it is.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

pub async fn update_profile(
    pool: &PgPool,
    user: &User,
    changes: ProfileChanges,
) -> Result<User, AppError> {
    let email = match changes.email {
        Some(email) => normalize_email(&email),
        None => user.email.clone(),
    };
    if email.is_empty() {
        return Err(AppError::BadRequest(
            "Users must have an email address".to_string(),
        ));
    }

    let name = changes
        .name
        .map(|n| n.trim().to_string())
        .unwrap_or_else(|| user.name.clone());

    let password_hash = changes
        .password
        .as_deref()
        .map(password::hash)
        .transpose()
        .map_err(AppError::Internal)?;

    db::users::update_profile(pool, user.id, &email, &name, password_hash.as_deref())
        .await
        .map_err(duplicate_email)
}

/// Provision the configured superuser unless an account with that email exists.
pub async fn ensure_superuser(pool: &PgPool, superuser: &SuperuserConfig) -> Result<(), AppError> {
    let email = normalize_email(&superuser.email);
    if db::users::find_by_email(pool, &email).await?.is_some() {
        tracing::debug!("Superuser {email} already exists");
        return Ok(());
    }

    create_superuser(pool, &email, &superuser.password).await?;
    tracing::info!("Superuser {email} created");
    Ok(())
}

fn duplicate_email(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::BadRequest("A user with this email already exists".to_string())
        }
        _ => AppError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_whole_address() {
        assert_eq!(normalize_email("alex@SHARKYYY.com"), "alex@sharkyyy.com");
        assert_eq!(normalize_email("Alex@Sharky.COM"), "alex@sharky.com");
        assert_eq!(normalize_email("  chef@example.com "), "chef@example.com");
    }

    #[test]
    fn normalize_keeps_addresses_without_domain() {
        assert_eq!(normalize_email(""), "");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("chef@example.com"));
        assert!(!is_valid_email("chef"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("chef@"));
        assert!(!is_valid_email("chef @example.com"));
        assert!(!is_valid_email("chef@.com"));
    }

    #[test]
    fn extras_default_to_active_regular_user() {
        let extras = UserExtras::default();
        assert!(extras.is_active);
        assert!(!extras.is_staff);
        assert!(!extras.is_superuser);
    }
}
