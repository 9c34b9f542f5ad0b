//! Transport plumbing shared by every provider adapter.

use std::time::Duration;

use interview::ProviderFailure;
use serde::Deserialize;

use crate::LlmError;

/// Longest slice of a raw error body copied into a failure message.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// A `reqwest` client plus the deadline it was built with.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Builds a transport whose requests are bounded by `timeout` end to end,
    /// including reading the body.
    pub fn new(timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()
            .map_err(|e| LlmError::ClientBuild {
                message: e.to_string(),
            })?;
        Ok(Self { client, timeout })
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Sends a prepared request and returns the body of a 2xx answer.
    ///
    /// Non-2xx answers become [`ProviderFailure::HttpStatus`] carrying the
    /// provider's own error message when the body has one.
    pub(crate) async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<String, ProviderFailure> {
        let response = request.send().await.map_err(|e| self.failure(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.failure(e))?;

        if !status.is_success() {
            return Err(ProviderFailure::HttpStatus {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }

    /// Maps a `reqwest` error, dropping the request URL from its text.
    pub(crate) fn failure(&self, error: reqwest::Error) -> ProviderFailure {
        let error = error.without_url();
        if error.is_timeout() {
            ProviderFailure::Timeout {
                after: self.timeout,
            }
        } else {
            ProviderFailure::Transport {
                message: error.to_string(),
            }
        }
    }
}

/// The `{"error": {"message": ...}}` object both providers use for errors.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Provider-reported message if `body` is an error object, else a truncated
/// copy of the body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ => body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    }
}
