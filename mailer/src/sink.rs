//! Observability side channel
//!
//! The handler reports what happens through an [`EventSink`] instead of
//! logging inline. [`TracingSink`] forwards to `tracing`.

use crate::handler::Delivery;
use tracing::{error, info};

/// Something worth reporting during an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailerEvent<'a> {
    /// A required top-level field was absent.
    RequiredFieldMissing {
        /// Name of the field.
        field: &'a str,
    },
    /// The template could not be fetched or decoded.
    TemplateUnavailable {
        /// Object key that was requested.
        key: &'a str,
        /// Failure text.
        error: &'a str,
    },
    /// Placeholders discovered in the template, per occurrence.
    PlaceholdersFound {
        /// Names in order of appearance.
        names: &'a [&'a str],
    },
    /// Placeholders with no value in the payload.
    PlaceholdersMissing {
        /// Missing names, per occurrence.
        names: &'a [String],
    },
    /// The email service accepted the message.
    EmailSent {
        /// Recipient address.
        recipient: &'a str,
    },
    /// The email service rejected the message.
    EmailFailed {
        /// Recipient address.
        recipient: &'a str,
        /// Failure text.
        error: &'a str,
    },
    /// The audit copy was stored.
    ArtifactSaved {
        /// Recipient address.
        recipient: &'a str,
        /// Artifact key.
        key: &'a str,
        /// Outcome of the send that preceded the write.
        delivery: Delivery,
    },
    /// The audit copy could not be stored.
    ArtifactWriteFailed {
        /// Artifact key.
        key: &'a str,
        /// Outcome of the send that preceded the write.
        delivery: Delivery,
        /// Failure text.
        error: &'a str,
    },
    /// The invocation ended with a server error.
    RequestFailed {
        /// Failure text.
        error: &'a str,
    },
}

/// Receiver of [`MailerEvent`]s.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn emit(&self, event: &MailerEvent<'_>);
}

/// Sink that forwards events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &MailerEvent<'_>) {
        match event {
            MailerEvent::RequiredFieldMissing { field } => {
                error!(field = %field, "{} is required", field)
            }
            MailerEvent::TemplateUnavailable { key, error } => {
                error!(key = %key, error = %error, "Template not found")
            }
            MailerEvent::PlaceholdersFound { names } => {
                info!(placeholders = ?names, "Placeholders found")
            }
            MailerEvent::PlaceholdersMissing { names } => {
                error!(missing = ?names, "Missing placeholders in the input")
            }
            MailerEvent::EmailSent { recipient } => info!(recipient = %recipient, "Email sent"),
            MailerEvent::EmailFailed { recipient, error } => {
                error!(recipient = %recipient, error = %error, "Error sending email")
            }
            MailerEvent::ArtifactSaved {
                recipient,
                key,
                delivery,
            } => info!(recipient = %recipient, key = %key, delivery = ?delivery, "Artifact saved"),
            MailerEvent::ArtifactWriteFailed { key, delivery, error } => {
                error!(key = %key, delivery = ?delivery, error = %error, "Error saving artifact")
            }
            MailerEvent::RequestFailed { error } => error!(error = %error, "Error occurred"),
        }
    }
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _: &MailerEvent<'_>) {}
}
