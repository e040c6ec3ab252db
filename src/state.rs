use crate::{config::AppConfig, db::Database, rate_fetcher::RateFetcher};

/// Shared application state, handed to every route through `web::Data`.
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub rates: RateFetcher,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db = Database::new(&config.db);
        let rates = RateFetcher::new(&config.exchange_api_url, config.exchange_api_key.clone())?;

        Ok(AppState { config, db, rates })
    }
}
