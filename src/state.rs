use std::sync::Arc;

use crate::config::Config;
use crate::feed::FeedBatchResolver;
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub feed: Arc<FeedBatchResolver>,
}

impl AppState {
    /// Wires the Postgres-backed collaborators into a feed resolver.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let feed = Arc::new(FeedBatchResolver::for_pool(
            pool.clone(),
            std::time::Duration::from_millis(config.feed_item_timeout_ms),
        ));
        Self { pool, config, feed }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<FeedBatchResolver> {
    fn from_ref(state: &AppState) -> Self {
        state.feed.clone()
    }
}
