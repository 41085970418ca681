use std::sync::Arc;

use sqlx::PgPool;

use crate::applications::storage::ResumeStorage;
use crate::auth::tokens::TokenIssuer;
use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Resume object store. Default: S3ResumeStorage.
    pub storage: Arc<dyn ResumeStorage>,
    pub llm: LlmClient,
    pub tokens: TokenIssuer,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State whose pool never connects; only paths that stop before the
    /// database can be exercised with it.
    pub fn for_tests(storage: Arc<dyn ResumeStorage>) -> Self {
        let config = Config::for_tests();
        let db = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        Self {
            db,
            storage,
            llm: LlmClient::new(config.anthropic_api_key.clone()).expect("http client"),
            tokens: TokenIssuer::from_config(&config),
            config,
        }
    }
}
