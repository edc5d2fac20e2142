//! HTTP client for the Alpha Vantage query API.

use std::time::Duration;

use url::Url;

use crate::{types::DailySeriesResponse, Error};

/// Request timeout for Alpha Vantage calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Alpha Vantage query API.
///
/// Holds one `reqwest::Client` for the lifetime of a run. The API key travels
/// as a query parameter, so URLs are never logged.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    /// Base URL for the API. Defaults to `https://www.alphavantage.co`.
    base_url: String,
}

impl Client {
    /// Creates a client pointing at the production API.
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::with_base_url("https://www.alphavantage.co", api_key)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: String) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn daily_series_url(&self, symbol: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{}/query", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("function", "TIME_SERIES_DAILY")
            .append_pair("symbol", symbol)
            .append_pair("outputsize", "full")
            .append_pair("apikey", &self.api_key);
        Ok(url)
    }

    /// Fetches the full daily history for `symbol`.
    ///
    /// A 200 response without a time series (throttling notes, unknown
    /// symbols) is still `Ok`; inspect [`DailySeriesResponse::time_series`].
    pub async fn get_daily_series(&self, symbol: &str) -> Result<DailySeriesResponse, Error> {
        let url = self.daily_series_url(symbol)?;
        tracing::debug!("GET TIME_SERIES_DAILY symbol={}", symbol);

        let resp = self.http.get(url).send().await.map_err(|e| {
            tracing::debug!("Failed to get daily series for {}: {}", symbol, e);
            Error::Network(e)
        })?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::debug!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<DailySeriesResponse>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::debug!("Failed to parse daily series: {} | body: {}", e, snippet);
            Error::ParseFailed(e.to_string())
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_series_url_carries_all_parameters() {
        let client = Client::with_base_url("http://localhost:1234/", "demo".to_string()).unwrap();
        let url = client.daily_series_url("IBM").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:1234/query?function=TIME_SERIES_DAILY&symbol=IBM&outputsize=full&apikey=demo"
        );
    }

    #[test]
    fn symbols_are_query_encoded() {
        let client = Client::with_base_url("http://localhost:1234", "k".to_string()).unwrap();
        let url = client.daily_series_url("BRK B").unwrap();
        assert!(url.as_str().contains("symbol=BRK+B"));
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("short"), "short");
        let long = "x".repeat(600);
        let out = truncate_body(&long);
        assert!(out.ends_with("...[truncated]"));
        assert_eq!(out.len(), 500 + "...[truncated]".len());
    }

    #[test]
    fn client_creation_with_defaults() {
        assert!(Client::new("test-key".to_string()).is_ok());
    }
}
