//! `{{name}}` placeholder discovery and substitution

use crate::{error::MailerError, event::Fields};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::{borrow::Cow, string::FromUtf8Error};

// `.` stops at newlines, so a marker never spans lines.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("invalid placeholder pattern"));

/// Text form of a payload value as it appears in rendered output.
///
/// Strings are used verbatim, every other value as its compact JSON text.
pub fn field_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// An HTML template as fetched from the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
}

impl Template {
    /// Wrap template text.
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    /// Decode a stored object as UTF-8.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FromUtf8Error> {
        String::from_utf8(bytes).map(Self::new)
    }

    /// Raw template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance, one entry per occurrence.
    pub fn placeholders(&self) -> Vec<&str> {
        PLACEHOLDER
            .captures_iter(&self.source)
            .filter_map(|caps| caps.get(1))
            .map(|name| name.as_str())
            .collect()
    }

    /// Placeholder occurrences with no matching payload key.
    pub fn missing_fields(&self, fields: &Fields) -> Vec<String> {
        self.placeholders()
            .into_iter()
            .filter(|name| !fields.contains_key(*name))
            .map(str::to_string)
            .collect()
    }

    /// Substitute every placeholder with its payload value.
    ///
    /// Nothing is rendered unless every placeholder has a value. Placeholders
    /// are replaced one name at a time in order of discovery, each across the
    /// whole current text, so a marker carried in by an earlier value is
    /// filled in by a later name.
    pub fn render(&self, fields: &Fields) -> Result<RenderedDocument, MailerError> {
        let missing = self.missing_fields(fields);
        if !missing.is_empty() {
            return Err(MailerError::MissingPlaceholders(missing));
        }

        let mut rendered = self.source.clone();
        for name in self.placeholders() {
            if let Some(value) = fields.get(name) {
                let marker = format!("{{{{{}}}}}", name);
                rendered = rendered.replace(&marker, &field_text(value));
            }
        }

        Ok(RenderedDocument(rendered))
    }
}

/// A template with all placeholders filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument(String);

impl RenderedDocument {
    /// Rendered HTML.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rendered HTML as bytes for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}
