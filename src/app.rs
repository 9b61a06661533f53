// src/app.rs
use crate::auth::magic::MagicLinkConfig;
use crate::config::AppConfig;
use crate::db::connection::Database;
use crate::rate_limit::RateLimiter;

/// Everything a request handler needs, shared by every worker.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            db: Database::new(config.database_path.clone()),
            limiter: RateLimiter::new(config.rate_limit_max, config.rate_limit_window_secs),
            config,
        }
    }

    pub fn magic_link_config(&self) -> MagicLinkConfig {
        MagicLinkConfig {
            ttl_secs: self.config.magic_link_ttl_secs,
            ..MagicLinkConfig::default()
        }
    }
}
