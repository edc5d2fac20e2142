//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The configured base URL could not be turned into a request URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Building the client, connecting, or reading the body failed (includes timeouts).
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The body was not the JSON document we expected.
    #[error("Failed to parse response: {0}")]
    ParseFailed(String),
}
