//! Invocation event decoding
//!
//! Events arrive either as the payload itself (direct invoke) or as an API
//! Gateway proxy event whose `body` holds the payload as JSON text,
//! optionally base64 encoded.

use crate::{error::MailerError, template::field_text};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Payload fields keyed by name.
pub type Fields = Map<String, Value>;

/// Key of the template to render.
pub const TEMPLATE_ID: &str = "template_id";
/// Destination address.
pub const EMAIL_ADDRESS: &str = "emailaddress";
/// Optional first name used in the artifact key.
pub const FIRST_NAME: &str = "firstName";

const BODY: &str = "body";
const IS_BASE64_ENCODED: &str = "isBase64Encoded";

/// The caller's field map, unwrapped from its event envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    fields: Fields,
}

impl Payload {
    /// Extract the payload from an invocation event.
    pub fn from_event(event: Value) -> Result<Self, MailerError> {
        let mut event = match event {
            Value::Object(map) => map,
            other => {
                return Err(MailerError::MalformedInput(format!(
                    "expected a JSON object event, found {}",
                    kind(&other)
                )))
            }
        };

        let fields = match event.remove(BODY) {
            None => event,
            Some(Value::String(body)) => {
                let encoded = event
                    .get(IS_BASE64_ENCODED)
                    .and_then(Value::as_bool)
                    .unwrap_or_default();
                decode_body(&body, encoded)?
            }
            Some(other) => {
                return Err(MailerError::MalformedInput(format!(
                    "expected `body` to be a JSON string, found {}",
                    kind(&other)
                )))
            }
        };

        Ok(Payload { fields })
    }

    /// All payload fields.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl From<Fields> for Payload {
    fn from(fields: Fields) -> Self {
        Payload { fields }
    }
}

fn decode_body(body: &str, base64_encoded: bool) -> Result<Fields, MailerError> {
    let bytes: Cow<'_, [u8]> = if base64_encoded {
        let decoded =
            base64::decode(body).map_err(|e| MailerError::MalformedInput(format!("invalid base64 body: {}", e)))?;
        Cow::Owned(decoded)
    } else {
        Cow::Borrowed(body.as_bytes())
    };

    let mut de = serde_json::Deserializer::from_slice(&bytes);
    let fields: Fields =
        serde_path_to_error::deserialize(&mut de).map_err(|e| MailerError::MalformedInput(e.to_string()))?;
    de.end().map_err(|e| MailerError::MalformedInput(e.to_string()))?;
    Ok(fields)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// Absent, null, false, zero and empty values all count as missing.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn present(fields: &Fields, name: &str) -> Option<String> {
    fields
        .get(name)
        .filter(|value| !is_blank(value))
        .map(|value| field_text(value).into_owned())
}

/// A payload that carries everything needed to render and deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct MailRequest {
    template_id: String,
    email_address: String,
    first_name: Option<String>,
    fields: Fields,
}

impl MailRequest {
    /// Key of the template to render, relative to the template prefix.
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    /// Destination address.
    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    /// `firstName`, when the caller supplied a non-empty one.
    ///
    /// A null or empty `firstName` is treated as absent, so the artifact
    /// lands under the default folder instead of an empty path segment.
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Every payload field, used as placeholder values.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// Checks `template_id` before `emailaddress` and reports only the first
/// one missing.
impl TryFrom<Payload> for MailRequest {
    type Error = MailerError;

    fn try_from(payload: Payload) -> Result<Self, Self::Error> {
        let fields = payload.fields;
        let template_id = present(&fields, TEMPLATE_ID).ok_or(MailerError::MissingField(TEMPLATE_ID))?;
        let email_address = present(&fields, EMAIL_ADDRESS).ok_or(MailerError::MissingField(EMAIL_ADDRESS))?;
        let first_name = fields
            .get(FIRST_NAME)
            .filter(|value| !value.is_null())
            .map(|value| field_text(value).into_owned())
            .filter(|name| !name.is_empty());

        Ok(MailRequest {
            template_id,
            email_address,
            first_name,
            fields,
        })
    }
}
