// src/config.rs

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

/// Development-only signing key used when `SECRET_KEY` is not set.
pub const DEFAULT_SECRET_KEY: &str = "dev-secret-change-me";

/// Local file-backed store used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://instance/test.db?mode=rwc";

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub session_ttl_seconds: u64,
    pub data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub log_dir: String,
    pub seed_user: Option<SeedUser>,
}

/// Account created at bootstrap when it does not exist yet.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let secret_key =
            env::var("SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string());

        let session_ttl_seconds = env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECONDS);

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let seed_user = match (
            env::var("SEED_USERNAME"),
            env::var("SEED_EMAIL"),
            env::var("SEED_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => Some(SeedUser {
                username,
                email,
                password,
            }),
            _ => None,
        };

        Self {
            database_url,
            secret_key,
            session_ttl_seconds,
            data_dir,
            port,
            rust_log,
            log_dir,
            seed_user,
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}
