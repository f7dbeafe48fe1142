//! Request-level failures

use crate::BoxError;
use http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

/// Everything that can end an invocation early.
///
/// A failed email send is deliberately absent: it only changes where the
/// artifact is written.
#[derive(Debug, Error)]
pub enum MailerError {
    /// The event or its `body` could not be decoded into a field map.
    #[error("{0}")]
    MalformedInput(String),
    /// A required top-level field is absent or empty.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The template references fields the payload does not carry.
    #[error("Missing placeholders in the input")]
    MissingPlaceholders(Vec<String>),
    /// The template could not be fetched or decoded.
    #[error("Template not found: {0}")]
    TemplateNotFound(BoxError),
    /// The audit copy could not be written.
    #[error("{0}")]
    ArtifactWrite(BoxError),
}

impl MailerError {
    /// Status code reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            MailerError::MissingField(_) | MailerError::MissingPlaceholders(_) => StatusCode::BAD_REQUEST,
            MailerError::MalformedInput(_) | MailerError::TemplateNotFound(_) | MailerError::ArtifactWrite(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON document describing the failure.
    pub fn body(&self) -> Value {
        match self {
            MailerError::MissingPlaceholders(missing) => json!({
                "error": self.to_string(),
                "missing_fields": missing,
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}
