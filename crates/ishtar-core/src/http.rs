//! Shared HTTP plumbing for external services

use crate::error::{IshtarError, Result};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Client with an explicit request timeout; no call may hang indefinitely
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("ishtar/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()?;
    Ok(client)
}

/// Map a transport failure to a transient backend error
pub(crate) fn send_error(service: &str, url: &str, e: reqwest::Error) -> IshtarError {
    if e.is_timeout() {
        IshtarError::Backend(format!("{} timed out ({})", service, url))
    } else if e.is_connect() {
        IshtarError::Backend(format!("{} unreachable ({}): {}", service, url, e))
    } else {
        IshtarError::Backend(format!("{} request failed ({}): {}", service, url, e))
    }
}

/// Pass successful responses through; turn error statuses into typed errors
pub(crate) async fn check_status(service: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(IshtarError::Auth(format!(
            "{} (HTTP {})",
            service,
            status.as_u16()
        ))),
        StatusCode::TOO_MANY_REQUESTS => Err(IshtarError::Backend(format!(
            "{} rate limited (HTTP 429): {}",
            service, body
        ))),
        s if s.is_client_error() => Err(IshtarError::Config(format!(
            "{} rejected the request (HTTP {}): {}",
            service,
            s.as_u16(),
            body
        ))),
        _ => Err(IshtarError::Backend(format!(
            "{} error (HTTP {}): {}",
            service,
            status.as_u16(),
            body
        ))),
    }
}
