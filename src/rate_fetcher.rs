use std::time::Duration;

use log::{error, info};
use reqwest::{Client, Url};

use crate::{
    currency::{Currency, REPORTING},
    error::AppError,
    exchange_rate::RateTable,
    live_quotes::LiveQuotes,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the quote provider. Always asks for USD quotes of the other
/// supported currencies.
pub struct RateFetcher {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RateFetcher {
    pub fn new(endpoint: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(RateFetcher {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    pub async fn rate_table(&self, base: Currency) -> Result<RateTable, AppError> {
        let quotes = self.get_live_quotes().await?;
        Ok(RateTable::from_quotes(&quotes, base))
    }

    pub async fn get_live_quotes(&self) -> Result<LiveQuotes, AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Config(
                "Missing exchange API key. Please set the API_KEY_EXCHANGE environment variable"
                    .to_string(),
            )
        })?;

        let url = get_url(&self.endpoint)?;
        let text = self.load_json(url, api_key).await.map_err(|e| {
            error!("Error fetching exchange rates from {}: {}", self.endpoint, e);
            AppError::Upstream(format!("Failed to fetch exchange rates: {}", e))
        })?;

        let quotes: LiveQuotes = serde_json::from_str(&text).map_err(|e| {
            error!("Unreadable exchange rate response: {}", e);
            AppError::Upstream(format!("Failed to fetch exchange rates: {}", e))
        })?;

        if !quotes.success {
            error!("Exchange rate provider error: {}", quotes.error_info());
            return Err(AppError::Upstream(format!(
                "API returned error: {}",
                quotes.error_info()
            )));
        }

        if quotes.quotes.is_none() {
            error!("Exchange rate response carried no quotes");
            return Err(AppError::Upstream(format!(
                "API returned error: {}",
                quotes.error_info()
            )));
        }

        info!("Fetched exchange rates (timestamp {:?})", quotes.timestamp);
        Ok(quotes)
    }

    async fn load_json(&self, url: Url, api_key: &str) -> anyhow::Result<String> {
        let resp = self.client.get(url).header("apikey", api_key).send().await?;
        if !resp.status().is_success() {
            anyhow::bail!("upstream answered {}", resp.status());
        }

        let text = resp.text().await?;

        Ok(text)
    }
}

fn get_url(endpoint: &str) -> Result<Url, AppError> {
    let symbols = Currency::ALL
        .iter()
        .filter(|c| **c != REPORTING)
        .map(|c| c.code())
        .collect::<Vec<_>>()
        .join(",");

    Url::parse_with_params(
        endpoint,
        &[("base", REPORTING.code()), ("symbols", symbols.as_str())],
    )
    .map_err(|e| AppError::Config(format!("invalid EXCHANGE_API_URL '{}': {}", endpoint, e)))
}
