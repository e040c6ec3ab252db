use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Default)]
pub struct ProviderError {
    pub info: Option<String>,
}

/// Body returned by the quote provider.
///
/// `currency_data/live` answers with `quotes` keyed `USDEUR` and a unix
/// `timestamp`; the older `latest` style answers with `rates` keyed `EUR`
/// and a `date`. Both land in `quotes`.
#[derive(Debug, Deserialize, PartialEq, Default)]
pub struct LiveQuotes {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "rates")]
    pub quotes: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub error: Option<ProviderError>,
}

impl LiveQuotes {
    pub fn error_info(&self) -> &str {
        self.error
            .as_ref()
            .and_then(|e| e.info.as_deref())
            .unwrap_or("Unknown error")
    }
}
