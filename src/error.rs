use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to the webhook sender. Only ingress-level malformation
/// produces a non-200; anything past payload validation is handled
/// out-of-band and never reaches an HTTP response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required config: {0}")]
    MissingRequired(String),

    #[error("invalid value for {0}")]
    InvalidValue(String),

    #[error("unsupported AI provider: {0} (use 'openai' or 'ollama')")]
    UnsupportedProvider(String),
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request to {provider} timed out after {secs}s")]
    Timeout { provider: &'static str, secs: u64 },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum GitLabError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitLab API error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Whole-review failures. Per-file and per-comment errors are logged and
/// absorbed before they can become one of these.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("could not resolve diff refs for MR !{iid}: missing {missing}")]
    MissingDiffRefs { iid: u64, missing: &'static str },

    #[error(transparent)]
    GitLab(#[from] GitLabError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            ApiError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        })
    }
}
