//! Fixed locations and message settings used by the handler.

use crate::handler::Delivery;

/// Bucket holding both templates and audit artifacts.
pub const DEFAULT_BUCKET: &str = "5a3f8d8c9f";
/// Key prefix under which templates are stored.
pub const DEFAULT_TEMPLATE_PREFIX: &str = "5a3f2c3d8t";
/// Key prefix under which rendered artifacts are written.
pub const DEFAULT_ARTIFACT_PREFIX: &str = "5a3f5c9a2u";
/// Status segment for artifacts whose email was accepted.
pub const DEFAULT_DELIVERED_SEGMENT: &str = "5a3fs6f2s";
/// Status segment for artifacts whose email send failed.
pub const DEFAULT_FAILED_SEGMENT: &str = "5a3fa1b7e";
/// Sender address of every message.
pub const DEFAULT_SENDER: &str = "support@captivtech.com";
/// Subject line of every message.
pub const DEFAULT_SUBJECT: &str = "Your Requested Information";
/// Folder name used when the request carries no `firstName`.
pub const DEFAULT_FIRST_NAME: &str = "Unknown";
/// Content type of stored artifacts.
pub const ARTIFACT_CONTENT_TYPE: &str = "text/html";

/// Settings for a [`RequestHandler`](crate::RequestHandler).
///
/// `Default` yields the production values; there is no environment lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailerConfig {
    /// Bucket read for templates and written for artifacts.
    pub bucket: String,
    /// Prefix prepended to `template_id` when fetching a template.
    pub template_prefix: String,
    /// Prefix of every artifact key.
    pub artifact_prefix: String,
    /// Status segment used when the email was sent.
    pub delivered_segment: String,
    /// Status segment used when the email send failed.
    pub failed_segment: String,
    /// Sender address.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Replacement for a missing `firstName`.
    pub default_first_name: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            template_prefix: DEFAULT_TEMPLATE_PREFIX.to_string(),
            artifact_prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
            delivered_segment: DEFAULT_DELIVERED_SEGMENT.to_string(),
            failed_segment: DEFAULT_FAILED_SEGMENT.to_string(),
            sender: DEFAULT_SENDER.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            default_first_name: DEFAULT_FIRST_NAME.to_string(),
        }
    }
}

impl MailerConfig {
    /// Object key of the template named `template_id`.
    pub fn template_key(&self, template_id: &str) -> String {
        format!("{}/{}", self.template_prefix, template_id)
    }

    /// Status segment recorded for a delivery outcome.
    pub fn status_segment(&self, delivery: Delivery) -> &str {
        match delivery {
            Delivery::Sent => &self.delivered_segment,
            Delivery::Failed => &self.failed_segment,
        }
    }

    /// Object key of the audit copy for one invocation.
    pub fn artifact_key(&self, first_name: &str, delivery: Delivery, email_address: &str) -> String {
        format!(
            "{}/{}/{}/{}.html",
            self.artifact_prefix,
            first_name,
            self.status_segment(delivery),
            email_address
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_key_joins_prefix_and_id() {
        let config = MailerConfig::default();
        assert_eq!(config.template_key("welcome.html"), "5a3f2c3d8t/welcome.html");
    }

    #[test]
    fn artifact_key_encodes_delivery_outcome() {
        let config = MailerConfig::default();
        assert_eq!(
            config.artifact_key("perumal", Delivery::Sent, "p@example.com"),
            "5a3f5c9a2u/perumal/5a3fs6f2s/p@example.com.html"
        );
        assert_eq!(
            config.artifact_key("perumal", Delivery::Failed, "p@example.com"),
            "5a3f5c9a2u/perumal/5a3fa1b7e/p@example.com.html"
        );
    }

    #[test]
    fn overridden_prefixes_are_used() {
        let config = MailerConfig {
            template_prefix: "templates".into(),
            artifact_prefix: "sent".into(),
            ..MailerConfig::default()
        };
        assert_eq!(config.template_key("a"), "templates/a");
        assert!(config.artifact_key("x", Delivery::Sent, "y").starts_with("sent/x/"));
    }
}
