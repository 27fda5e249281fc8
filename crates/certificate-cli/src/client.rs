// HTTP client for a running certificate server

use std::time::Duration;

use anyhow::{anyhow, Result};
use certificate_core::{CertificateRequest, CertificateResponse, ErrorResponse};

/// Default server address, matching the server's default bind port.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

const ISSUE_PATH: &str = "/api/v1/certificates";

/// Rendering launches a browser, so allow far longer than a plain API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Builds the issuance endpoint URL for a server base URL.
pub fn issue_url(server: &str) -> String {
    format!("{}{}", server.trim_end_matches('/'), ISSUE_PATH)
}

/// Posts an issuance request and returns the server's success body.
///
/// Non-2xx responses become errors carrying the server's message when the
/// body is a JSON error, or the raw body otherwise.
pub fn issue(server: &str, request: &CertificateRequest) -> Result<CertificateResponse> {
    let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
    let url = issue_url(server);

    match agent.post(&url).send_json(request) {
        Ok(response) => response
            .into_json::<CertificateResponse>()
            .map_err(|e| anyhow!("Unexpected response from {}: {}", url, e)),
        Err(ureq::Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            Err(anyhow!("Server returned {}: {}", code, failure_message(&body)))
        }
        Err(ureq::Error::Transport(e)) => Err(anyhow!("Failed to reach {}: {}", url, e)),
    }
}

/// Extracts a readable message from an error response body.
fn failure_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body).ok() {
        Some(err) => format!("{} ({})", err.message, err.error),
        None if body.trim().is_empty() => "empty response body".to_string(),
        None => body.trim().to_string(),
    }
}
