// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Page size used by the feed when the client does not ask for one.
pub const DEFAULT_FEED_LIMIT: i64 = 20;

/// Upper bound on a single feed page.
pub const MAX_FEED_LIMIT: i64 = 100;

/// How many of the most recent comments are embedded in each feed item.
pub const RECENT_COMMENTS_PER_POST: i64 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    /// Upper bound on resolving a single feed item before it is degraded.
    pub feed_item_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let feed_item_timeout_ms = env::var("FEED_ITEM_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2_000);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            feed_item_timeout_ms,
        }
    }
}
