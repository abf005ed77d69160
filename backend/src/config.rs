//! Environment-driven server configuration.

use std::env;

/// Runtime configuration, read once at startup. Every value has a
/// development default so the server runs with no environment set up.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in days; tokens are valid until natural expiry
    pub jwt_expire_days: i64,
    /// Origin allowed by the CORS layer
    pub client_origin: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5001),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:wallet_tracker.db".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-only-change-me".to_string()),
            jwt_expire_days: env::var("JWT_EXPIRE_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            client_origin: env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}
