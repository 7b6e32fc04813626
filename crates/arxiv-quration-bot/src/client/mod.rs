//! HTTP clients for the three external APIs.
//!
//! Every client is built from the same reqwest configuration:
//! - Explicit request and connect timeouts
//! - gzip and connection pooling via reqwest
//! - Shared status-code mapping into [`ClientError`]
//!
//! Nothing retries; a failed call is reported to the caller.

mod arxiv;
mod deepl;
mod github;

use std::time::Duration;

use reqwest::Client;
use reqwest::header::HeaderMap;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

pub use arxiv::{ArxivClient, parse_feed};
pub use deepl::DeeplClient;
pub use github::{GitHubAppClient, Installation, InstallationAccount, InstallationClient};

/// User agent sent with every request (GitHub rejects requests without one).
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client with the configured timeouts.
pub(crate) fn http_client(config: &Config, headers: HeaderMap) -> ClientResult<Client> {
    let client = Client::builder()
        .default_headers(headers)
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .gzip(true)
        .build()?;

    Ok(client)
}

/// Map a send failure, keeping timeouts distinguishable.
pub(crate) fn send_error(err: reqwest::Error, timeout: Duration) -> ClientError {
    if err.is_timeout() { ClientError::Timeout(timeout) } else { ClientError::Http(err) }
}

/// Handle API response status codes.
pub(crate) async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            Err(ClientError::rate_limited(retry_after))
        }
        401 | 403 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::unauthorized(status.as_u16(), text))
        }
        404 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::not_found(text))
        }
        400 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::bad_request(text))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}
