//! Service Configuration
//! Mission: Gather secrets and settings once at startup, fail fast when a secret is missing

use anyhow::{bail, Result};

/// Configuration for the API service
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub port: u16,
    pub auth_db_path: String,
    pub jokes_db_path: String,
    /// When unset the API falls back to an in-memory blacklist (dev only)
    pub redis_url: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let access_token_secret = require_secret("ACCESS_TOKEN_SECRET")?;
        let refresh_token_secret = require_secret("REFRESH_TOKEN_SECRET")?;

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse()
            .unwrap_or(5001);

        let auth_db_path =
            std::env::var("AUTH_DB_PATH").unwrap_or_else(|_| "./jokebox_auth.db".to_string());

        let jokes_db_path =
            std::env::var("JOKES_DB_PATH").unwrap_or_else(|_| "./jokebox_jokes.db".to_string());

        let redis_url = std::env::var("REDIS_URL").ok().filter(|v| !v.is_empty());

        Ok(Self {
            access_token_secret,
            refresh_token_secret,
            port,
            auth_db_path,
            jokes_db_path,
            redis_url,
        })
    }
}

/// Configuration for the front-end service
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// The front end verifies access tokens locally with the same secret the API signs with
    pub access_token_secret: String,
    pub session_secret: String,
    pub api_url: String,
    pub port: u16,
    /// Secure cookies are only enforced in production (Safari rejects them on localhost)
    pub secure_cookies: bool,
}

impl WebConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let access_token_secret = require_secret("ACCESS_TOKEN_SECRET")?;
        let session_secret = require_secret("SESSION_SECRET")?;

        let api_url = std::env::var("API_URL")
            .unwrap_or_else(|_| "http://localhost:5001".to_string())
            .trim_end_matches('/')
            .to_string();

        let port = std::env::var("WEB_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        let secure_cookies = std::env::var("ENVIRONMENT")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Ok(Self {
            access_token_secret,
            session_secret,
            api_url,
            port,
            secure_cookies,
        })
    }
}

fn require_secret(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{} must be set", name),
    }
}
