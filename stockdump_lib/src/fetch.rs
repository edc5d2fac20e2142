//! Per-symbol price retrieval.
//!
//! A fetch never fails the batch: every error is captured in
//! [`FetchOutcome::Failed`] so the collector can log it and move on.

use async_trait::async_trait;
use thiserror::Error;

use crate::normalize::{parse_daily_series, NormalizeError};
use crate::record::PriceRecord;
use crate::window::DateWindow;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request error: {0}")]
    Request(#[from] alphavantage_api::Error),
    /// 200 response without a daily series (throttling note, bad symbol, bad key).
    #[error("no daily series in response: {0}")]
    ApiNotice(String),
    #[error("malformed series: {0}")]
    Parse(#[from] NormalizeError),
}

/// Result of one symbol's fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The series was retrieved. May be empty if nothing fell in the window.
    Fetched(Vec<PriceRecord>),
    Failed(FetchError),
}

impl FetchOutcome {
    /// Rows of a successful fetch, or nothing on failure.
    pub fn records(self) -> Vec<PriceRecord> {
        match self {
            Self::Fetched(rows) => rows,
            Self::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A source of daily prices for one symbol at a time.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, symbol: &str, window: &DateWindow) -> FetchOutcome;
}

/// [`PriceSource`] backed by the Alpha Vantage `TIME_SERIES_DAILY` endpoint.
///
/// One HTTP call per fetch, full output size, no retries.
pub struct AlphaVantageSource {
    client: alphavantage_api::Client,
}

impl AlphaVantageSource {
    pub fn new(client: alphavantage_api::Client) -> Self {
        Self { client }
    }

    async fn try_fetch(
        &self,
        symbol: &str,
        window: &DateWindow,
    ) -> Result<Vec<PriceRecord>, FetchError> {
        let response = self.client.get_daily_series(symbol).await?;
        let Some(series) = response.time_series.as_ref() else {
            let notice = response.notice().unwrap_or("Unknown error");
            return Err(FetchError::ApiNotice(notice.to_string()));
        };
        Ok(parse_daily_series(series, symbol, window)?)
    }
}

#[async_trait]
impl PriceSource for AlphaVantageSource {
    async fn fetch(&self, symbol: &str, window: &DateWindow) -> FetchOutcome {
        tracing::info!("Fetching data for {}", symbol);
        match self.try_fetch(symbol, window).await {
            Ok(rows) => {
                tracing::debug!("{}: {} rows in {}", symbol, rows.len(), window);
                FetchOutcome::Fetched(rows)
            }
            Err(e) => {
                tracing::warn!("Error fetching data for {}: {}", symbol, e);
                FetchOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn window(start: &str, end: &str) -> DateWindow {
        DateWindow::parse(start, end).unwrap()
    }

    async fn source_for(server: &MockServer) -> AlphaVantageSource {
        let client =
            alphavantage_api::Client::with_base_url(&server.uri(), "test-key".to_string()).unwrap();
        AlphaVantageSource::new(client)
    }

    fn abc_series() -> serde_json::Value {
        serde_json::json!({
            "Meta Data": { "2. Symbol": "ABC" },
            "Time Series (Daily)": {
                "2024-01-02": {
                    "1. open": "10",
                    "2. high": "12",
                    "3. low": "9",
                    "4. close": "11",
                    "5. volume": "1000"
                }
            }
        })
    }

    #[tokio::test]
    async fn success_returns_rows_in_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("symbol", "ABC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(abc_series()))
            .expect(1)
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let outcome = source.fetch("ABC", &window("2024-01-01", "2024-01-03")).await;

        assert!(!outcome.is_failure());
        let rows = outcome.records();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "ABC");
        assert_eq!(rows[0].close, 11.0);
    }

    #[tokio::test]
    async fn success_outside_window_is_empty_but_not_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(abc_series()))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let outcome = source.fetch("ABC", &window("2024-01-03", "2024-01-05")).await;

        assert!(matches!(&outcome, FetchOutcome::Fetched(rows) if rows.is_empty()));
    }

    #[tokio::test]
    async fn rate_limit_note_yields_empty_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"Note": "rate limit"})),
            )
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let outcome = source.fetch("ABC", &window("2024-01-01", "2024-01-03")).await;

        match &outcome {
            FetchOutcome::Failed(FetchError::ApiNotice(msg)) => assert_eq!(msg, "rate limit"),
            other => panic!("expected ApiNotice, got {:?}", other),
        }
        assert!(outcome.records().is_empty());
    }

    #[tokio::test]
    async fn unknown_payload_reports_unknown_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let outcome = source.fetch("ABC", &window("2024-01-01", "2024-01-03")).await;

        assert!(
            matches!(outcome, FetchOutcome::Failed(FetchError::ApiNotice(ref m)) if m == "Unknown error")
        );
    }

    #[tokio::test]
    async fn server_error_is_recoverable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let outcome = source.fetch("ABC", &window("2024-01-01", "2024-01-03")).await;

        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::Request(_))));
    }

    #[tokio::test]
    async fn non_json_body_is_recoverable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let outcome = source.fetch("ABC", &window("2024-01-01", "2024-01-03")).await;

        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::Request(_))));
    }

    #[tokio::test]
    async fn malformed_number_is_recoverable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Time Series (Daily)": {
                    "2024-01-02": {
                        "1. open": "ten",
                        "2. high": "12",
                        "3. low": "9",
                        "4. close": "11",
                        "5. volume": "1000"
                    }
                }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let outcome = source.fetch("ABC", &window("2024-01-01", "2024-01-03")).await;

        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::Parse(_))));
    }
}
