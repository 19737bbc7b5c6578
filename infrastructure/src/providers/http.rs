//! HTTP plumbing shared by the provider adapters

use assembly_application::ProviderError;
use assembly_domain::core::string::truncate;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use std::time::Duration;

/// Error bodies are cut to this many bytes before they reach a message
const MAX_ERROR_BODY: usize = 200;

/// Map a non-success HTTP status to a provider error
pub(crate) fn classify_status(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> ProviderError {
    let detail = format!("HTTP {}: {}", status.as_u16(), truncate(body.trim(), MAX_ERROR_BODY));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthenticated(detail),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { retry_after },
        StatusCode::REQUEST_TIMEOUT => ProviderError::TransientNetwork(detail),
        s if s.is_server_error() => ProviderError::TransientNetwork(detail),
        _ => ProviderError::Unknown(detail),
    }
}

/// Map a transport-level failure to a provider error
pub(crate) fn classify_transport(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else if error.is_decode() {
        ProviderError::Unknown(format!("undecodable response: {error}"))
    } else {
        // Connect and request errors; the message names the URL, never headers
        ProviderError::TransientNetwork(error.without_url().to_string())
    }
}

/// `retry-after` in whole seconds, when present
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Pass a success response through, or turn it into a classified error
pub(crate) async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let retry_after = parse_retry_after(response.headers());
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, retry_after, &body))
}
