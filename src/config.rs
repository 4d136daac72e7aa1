use std::net::IpAddr;
use std::path::PathBuf;

/// One year.
const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub media_root: PathBuf,
    pub max_upload_size: usize,
    pub token_ttl_minutes: i64,
    pub log_level: String,
    pub superuser: Option<SuperuserConfig>,
}

/// Credentials for the superuser provisioned at startup.
#[derive(Debug, Clone)]
pub struct SuperuserConfig {
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("RECIPES_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid RECIPES_HOST: {e}"))?;

        let port: u16 = env_or("RECIPES_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid RECIPES_PORT: {e}"))?;

        let base_url = env_or("RECIPES_BASE_URL", &format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let media_root = PathBuf::from(env_or("RECIPES_MEDIA_ROOT", "media"));

        let max_upload_size: usize = env_or("RECIPES_MAX_UPLOAD_SIZE", "5242880")
            .parse()
            .map_err(|e| format!("Invalid RECIPES_MAX_UPLOAD_SIZE: {e}"))?;

        let token_ttl_minutes: i64 = env_or("RECIPES_TOKEN_TTL_MINUTES", "1440")
            .parse()
            .map_err(|e| format!("Invalid RECIPES_TOKEN_TTL_MINUTES: {e}"))?;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&token_ttl_minutes) {
            return Err(format!(
                "RECIPES_TOKEN_TTL_MINUTES must be between 1 and {MAX_TOKEN_TTL_MINUTES}"
            ));
        }

        let log_level = env_or("RECIPES_LOG_LEVEL", "info");

        let superuser = match (
            std::env::var("RECIPES_SUPERUSER_EMAIL").ok(),
            std::env::var("RECIPES_SUPERUSER_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(SuperuserConfig { email, password }),
            (None, None) => None,
            _ => {
                return Err(
                    "RECIPES_SUPERUSER_EMAIL and RECIPES_SUPERUSER_PASSWORD must be set together"
                        .to_string(),
                );
            }
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            media_root,
            max_upload_size,
            token_ttl_minutes,
            log_level,
            superuser,
        })
    }

    /// Public URL prefix under which stored media is served.
    pub fn media_url(&self) -> String {
        format!("{}/media", self.base_url)
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
