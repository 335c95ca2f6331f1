pub mod agenda;
pub mod lms;

use thiserror::Error;

/// Errors from a source adapter. The sync engine needs to tell a rejected
/// bearer token apart from an unreachable or misbehaving upstream.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Upstream rejected the bearer token")]
    Unauthorized,

    #[error("Upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl ClientError {
    /// Map a non-success response to the right variant. 401/403 means the
    /// credential itself is bad; anything else is an upstream fault.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Self::Unauthorized;
        }
        let body = response.text().await.unwrap_or_default();
        Self::Api { status, body }
    }
}
