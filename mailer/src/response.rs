//! Response types

use crate::{error::MailerError, handler::Artifact};
use http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

/// Message returned with every successful invocation.
pub const SUCCESS_MESSAGE: &str = "File saved successfully!";

/// Representation of the Lambda response
///
/// `body` holds JSON text, as API Gateway proxy integrations expect.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// JSON encoded body.
    pub body: String,
}

impl HandlerResponse {
    /// Build a response from a status and a JSON document.
    pub fn new(status: StatusCode, body: &Value) -> Self {
        Self {
            status_code: status.as_u16(),
            body: body.to_string(),
        }
    }

    /// Decode `body` back into a JSON document.
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// A conversion of self into a [`HandlerResponse`].
pub trait IntoResponse {
    /// Return a translation of `self` into a `HandlerResponse`
    fn into_response(self) -> HandlerResponse;
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> HandlerResponse {
        self
    }
}

impl IntoResponse for Artifact {
    fn into_response(self) -> HandlerResponse {
        HandlerResponse::new(
            StatusCode::OK,
            &json!({ "message": SUCCESS_MESSAGE, "file_path": self.key }),
        )
    }
}

impl IntoResponse for MailerError {
    fn into_response(self) -> HandlerResponse {
        HandlerResponse::new(self.status(), &self.body())
    }
}

impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: IntoResponse,
{
    fn into_response(self) -> HandlerResponse {
        match self {
            Ok(ok) => ok.into_response(),
            Err(err) => err.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Delivery;

    #[test]
    fn serializes_in_proxy_shape() {
        let response = HandlerResponse::new(StatusCode::BAD_REQUEST, &json!({ "error": "x" }));
        assert_eq!(
            serde_json::to_string(&response).expect("failed to serialize response"),
            r#"{"statusCode":400,"body":"{\"error\":\"x\"}"}"#
        );
    }

    #[test]
    fn artifact_into_response() {
        let response = Artifact {
            key: "5a3f5c9a2u/Ana/5a3fs6f2s/a@example.com.html".into(),
            delivery: Delivery::Sent,
        }
        .into_response();
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.json().expect("invalid body"),
            json!({
                "message": "File saved successfully!",
                "file_path": "5a3f5c9a2u/Ana/5a3fs6f2s/a@example.com.html",
            })
        );
    }

    #[test]
    fn error_into_response() {
        let response = MailerError::MissingField("template_id").into_response();
        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.json().expect("invalid body"),
            json!({ "error": "template_id is required" })
        );
    }

    #[test]
    fn result_into_response() {
        let failed: Result<Artifact, MailerError> = Err(MailerError::ArtifactWrite("AccessDenied".into()));
        let response = failed.into_response();
        assert_eq!(response.status_code, 500);
        assert_eq!(response.json().expect("invalid body"), json!({ "error": "AccessDenied" }));
    }
}
