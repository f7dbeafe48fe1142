//! The invocation flow: parse, validate, fetch, render, send, persist.

use crate::{
    config::{MailerConfig, ARTIFACT_CONTENT_TYPE},
    email::EmailService,
    error::MailerError,
    event::{MailRequest, Payload},
    response::{HandlerResponse, IntoResponse},
    sink::{EventSink, MailerEvent, TracingSink},
    store::ObjectStore,
    template::{RenderedDocument, Template},
    BoxError,
};
use serde_json::Value;

/// Outcome of the email send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The email service accepted the message.
    Sent,
    /// The email service rejected the message or could not be reached.
    Failed,
}

/// The stored audit copy of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Object key the document was written to.
    pub key: String,
    /// Send outcome encoded in `key`.
    pub delivery: Delivery,
}

/// Handles one invocation event at a time.
///
/// Template reads, the email send and the artifact write happen strictly in
/// that order; nothing is retried.
pub struct RequestHandler<S, M> {
    store: S,
    mailer: M,
    sink: Box<dyn EventSink>,
    config: MailerConfig,
}

impl<S, M> RequestHandler<S, M>
where
    S: ObjectStore,
    M: EmailService,
{
    /// A handler with the default configuration, reporting to `tracing`.
    pub fn new(store: S, mailer: M) -> Self {
        Self {
            store,
            mailer,
            sink: Box::new(TracingSink),
            config: MailerConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: MailerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Process `event` and encode the outcome as a response.
    pub async fn handle(&self, event: Value) -> HandlerResponse {
        self.process(event).await.into_response()
    }

    /// Process `event`, returning the stored artifact or the failure that
    /// stopped the invocation.
    pub async fn process(&self, event: Value) -> Result<Artifact, MailerError> {
        let result = self.run(event).await;
        if let Err(err) = &result {
            if err.status().is_server_error() {
                self.sink.emit(&MailerEvent::RequestFailed { error: &err.to_string() });
            }
        }
        result
    }

    async fn run(&self, event: Value) -> Result<Artifact, MailerError> {
        let request = MailRequest::try_from(Payload::from_event(event)?).map_err(|err| {
            if let MailerError::MissingField(field) = &err {
                self.sink.emit(&MailerEvent::RequiredFieldMissing { field: *field });
            }
            err
        })?;

        let template = self.fetch_template(request.template_id()).await?;
        let document = self.render(&template, &request)?;
        let delivery = self.deliver(&request, &document).await;
        self.persist(&request, &document, delivery).await
    }

    async fn fetch_template(&self, template_id: &str) -> Result<Template, MailerError> {
        let key = self.config.template_key(template_id);
        let fetched: Result<Template, BoxError> = match self.store.get(&self.config.bucket, &key).await {
            Ok(bytes) => Template::from_bytes(bytes).map_err(|e| e.into()),
            Err(e) => Err(e),
        };

        fetched.map_err(|e| {
            self.sink.emit(&MailerEvent::TemplateUnavailable {
                key: &key,
                error: &e.to_string(),
            });
            MailerError::TemplateNotFound(e)
        })
    }

    fn render(&self, template: &Template, request: &MailRequest) -> Result<RenderedDocument, MailerError> {
        let names = template.placeholders();
        self.sink.emit(&MailerEvent::PlaceholdersFound { names: &names });

        template.render(request.fields()).map_err(|err| {
            if let MailerError::MissingPlaceholders(missing) = &err {
                self.sink.emit(&MailerEvent::PlaceholdersMissing { names: missing.as_slice() });
            }
            err
        })
    }

    // A failed send is recorded, never returned.
    async fn deliver(&self, request: &MailRequest, document: &RenderedDocument) -> Delivery {
        let recipient = request.email_address();
        let sent = self
            .mailer
            .send(&self.config.sender, recipient, &self.config.subject, document.as_str())
            .await;

        match sent {
            Ok(()) => {
                self.sink.emit(&MailerEvent::EmailSent { recipient });
                Delivery::Sent
            }
            Err(e) => {
                self.sink.emit(&MailerEvent::EmailFailed {
                    recipient,
                    error: &e.to_string(),
                });
                Delivery::Failed
            }
        }
    }

    async fn persist(
        &self,
        request: &MailRequest,
        document: &RenderedDocument,
        delivery: Delivery,
    ) -> Result<Artifact, MailerError> {
        let first_name = request.first_name().unwrap_or(&self.config.default_first_name);
        let key = self
            .config
            .artifact_key(first_name, delivery, request.email_address());

        if let Err(e) = self
            .store
            .put(&self.config.bucket, &key, document.to_bytes(), ARTIFACT_CONTENT_TYPE)
            .await
        {
            self.sink.emit(&MailerEvent::ArtifactWriteFailed {
                key: &key,
                delivery,
                error: &e.to_string(),
            });
            return Err(MailerError::ArtifactWrite(e));
        }

        self.sink.emit(&MailerEvent::ArtifactSaved {
            recipient: request.email_address(),
            key: &key,
            delivery,
        });
        Ok(Artifact { key, delivery })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{DEFAULT_BUCKET, DEFAULT_FAILED_SEGMENT, DEFAULT_DELIVERED_SEGMENT, DEFAULT_SENDER, DEFAULT_SUBJECT},
        memory::{MemoryOutbox, MemoryStore},
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    const TEMPLATE_KEY: &str = "5a3f2c3d8t/welcome.html";

    #[derive(Default, Clone)]
    struct RecordingSink {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: &MailerEvent<'_>) {
            self.events.lock().unwrap().push(format!("{:?}", event));
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        outbox: Arc<MemoryOutbox>,
        sink: RecordingSink,
        handler: RequestHandler<Arc<MemoryStore>, Arc<MemoryOutbox>>,
    }

    fn fixture(store: MemoryStore, outbox: MemoryOutbox) -> Fixture {
        let store = Arc::new(store);
        let outbox = Arc::new(outbox);
        let sink = RecordingSink::default();
        let handler = RequestHandler::new(Arc::clone(&store), Arc::clone(&outbox)).with_sink(sink.clone());
        Fixture {
            store,
            outbox,
            sink,
            handler,
        }
    }

    fn with_template(source: &str) -> MemoryStore {
        MemoryStore::new().with_object(DEFAULT_BUCKET, TEMPLATE_KEY, source)
    }

    fn request() -> Value {
        json!({
            "template_id": "welcome.html",
            "firstName": "perumal",
            "emailaddress": "perumal@example.com",
            "url": "https://www.example.com/",
        })
    }

    #[tokio::test]
    async fn missing_template_id_is_a_client_error() {
        let f = fixture(with_template("hi"), MemoryOutbox::new());
        let response = f.handler.handle(json!({ "emailaddress": "a@example.com" })).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(response.json().unwrap(), json!({ "error": "template_id is required" }));
        assert!(f.outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_email_is_a_client_error() {
        let f = fixture(with_template("hi"), MemoryOutbox::new());
        let response = f.handler.handle(json!({ "template_id": "welcome.html" })).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(response.json().unwrap(), json!({ "error": "emailaddress is required" }));
    }

    #[tokio::test]
    async fn both_missing_reports_template_id() {
        let f = fixture(with_template("hi"), MemoryOutbox::new());
        let response = f.handler.handle(json!({ "firstName": "Ana" })).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(response.json().unwrap(), json!({ "error": "template_id is required" }));
        assert_eq!(
            f.sink.events(),
            vec![r#"RequiredFieldMissing { field: "template_id" }"#]
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_server_error() {
        let f = fixture(with_template("hi"), MemoryOutbox::new());
        let response = f.handler.handle(json!({ "body": "{oops" })).await;
        assert_eq!(response.status_code, 500);
        assert!(response.json().unwrap()["error"].is_string());
        assert_eq!(f.store.keys(DEFAULT_BUCKET), vec![TEMPLATE_KEY]);
    }

    #[tokio::test]
    async fn unknown_template_stops_before_side_effects() {
        let f = fixture(MemoryStore::new(), MemoryOutbox::new());
        let response = f.handler.handle(request()).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.json().unwrap(),
            json!({ "error": "Template not found: NoSuchKey: 5a3f8d8c9f/5a3f2c3d8t/welcome.html" })
        );
        assert!(f.outbox.sent().is_empty());
        assert!(f.store.keys(DEFAULT_BUCKET).is_empty());
    }

    #[tokio::test]
    async fn non_utf8_template_is_not_found() {
        let store = MemoryStore::new().with_object(DEFAULT_BUCKET, TEMPLATE_KEY, vec![0xff, 0xfe]);
        let f = fixture(store, MemoryOutbox::new());
        let err = f.handler.process(request()).await.unwrap_err();
        assert!(matches!(err, MailerError::TemplateNotFound(_)));
    }

    #[tokio::test]
    async fn missing_placeholders_are_listed() {
        let f = fixture(with_template("{{a}} {{b}}"), MemoryOutbox::new());
        let response = f
            .handler
            .handle(json!({ "template_id": "welcome.html", "emailaddress": "a@example.com", "a": 1 }))
            .await;
        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.json().unwrap(),
            json!({ "error": "Missing placeholders in the input", "missing_fields": ["b"] })
        );
        assert!(f.outbox.sent().is_empty());
        assert_eq!(f.store.keys(DEFAULT_BUCKET), vec![TEMPLATE_KEY]);
    }

    #[tokio::test]
    async fn plain_template_is_sent_and_saved_unchanged() {
        let f = fixture(with_template("<h1>Hello</h1>"), MemoryOutbox::new());
        let response = f.handler.handle(request()).await;
        let key = format!("5a3f5c9a2u/perumal/{}/perumal@example.com.html", DEFAULT_DELIVERED_SEGMENT);

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.json().unwrap(),
            json!({ "message": "File saved successfully!", "file_path": key })
        );

        let artifact = f.store.object(DEFAULT_BUCKET, &key).expect("artifact not stored");
        assert_eq!(artifact.bytes, b"<h1>Hello</h1>".to_vec());
        assert_eq!(artifact.content_type, "text/html");

        let sent = f.outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, DEFAULT_SENDER);
        assert_eq!(sent[0].to, "perumal@example.com");
        assert_eq!(sent[0].subject, DEFAULT_SUBJECT);
        assert_eq!(sent[0].html, "<h1>Hello</h1>");
    }

    #[tokio::test]
    async fn placeholders_are_filled_in_mail_and_artifact() {
        let f = fixture(
            with_template("<p>Hi {{firstName}}, visit <a href=\"{{url}}\">{{url}}</a></p>"),
            MemoryOutbox::new(),
        );
        let artifact = f.handler.process(request()).await.expect("process failed");
        let expected = "<p>Hi perumal, visit <a href=\"https://www.example.com/\">https://www.example.com/</a></p>";

        assert_eq!(artifact.delivery, Delivery::Sent);
        assert_eq!(f.outbox.sent()[0].html, expected);
        assert_eq!(
            f.store.object(DEFAULT_BUCKET, &artifact.key).map(|o| o.bytes),
            Some(expected.as_bytes().to_vec())
        );
    }

    #[tokio::test]
    async fn failed_send_still_saves_under_failure_segment() {
        let f = fixture(with_template("<h1>Hello</h1>"), MemoryOutbox::failing("MessageRejected"));
        let response = f.handler.handle(request()).await;
        let key = format!("5a3f5c9a2u/perumal/{}/perumal@example.com.html", DEFAULT_FAILED_SEGMENT);

        assert_eq!(response.status_code, 200);
        assert_eq!(response.json().unwrap()["file_path"], json!(key));
        assert!(f.store.object(DEFAULT_BUCKET, &key).is_some());
        assert!(f
            .sink
            .events()
            .iter()
            .any(|e| e.starts_with("EmailFailed") && e.contains("MessageRejected")));
    }

    #[tokio::test]
    async fn missing_first_name_uses_default_folder() {
        let f = fixture(with_template("x"), MemoryOutbox::new());
        let artifact = f
            .handler
            .process(json!({ "template_id": "welcome.html", "emailaddress": "a@example.com" }))
            .await
            .expect("process failed");
        assert_eq!(
            artifact.key,
            format!("5a3f5c9a2u/Unknown/{}/a@example.com.html", DEFAULT_DELIVERED_SEGMENT)
        );
    }

    #[tokio::test]
    async fn proxy_event_body_is_handled() {
        let f = fixture(with_template("{{url}}"), MemoryOutbox::new());
        let event = json!({ "httpMethod": "POST", "body": request().to_string() });
        let response = f.handler.handle(event).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(f.outbox.sent()[0].html, "https://www.example.com/");
    }

    #[tokio::test]
    async fn artifact_write_failure_is_a_server_error_after_sending() {
        let store = MemoryStore::rejecting_writes().with_object(DEFAULT_BUCKET, TEMPLATE_KEY, "hi");
        let f = fixture(store, MemoryOutbox::new());
        let response = f.handler.handle(request()).await;

        assert_eq!(response.status_code, 500);
        assert!(response.json().unwrap()["error"]
            .as_str()
            .unwrap()
            .starts_with("AccessDenied"));
        assert_eq!(f.outbox.sent().len(), 1);
        let events = f.sink.events();
        assert!(events.iter().any(|e| e.starts_with("ArtifactWriteFailed") && e.contains("Sent")));
        assert!(events.last().unwrap().starts_with("RequestFailed"));
    }

    #[tokio::test]
    async fn custom_config_changes_locations_and_message() {
        let config = MailerConfig {
            bucket: "mail".into(),
            template_prefix: "templates".into(),
            artifact_prefix: "audit".into(),
            delivered_segment: "ok".into(),
            sender: "noreply@example.com".into(),
            subject: "Hello".into(),
            ..MailerConfig::default()
        };
        let store = MemoryStore::new().with_object("mail", "templates/welcome.html", "hi");
        let f = fixture(store, MemoryOutbox::new());
        let handler = f.handler.with_config(config);

        let artifact = handler.process(request()).await.expect("process failed");
        assert_eq!(artifact.key, "audit/perumal/ok/perumal@example.com.html");
        assert_eq!(f.outbox.sent()[0].from, "noreply@example.com");
        assert_eq!(f.outbox.sent()[0].subject, "Hello");
        assert!(f.store.object("mail", &artifact.key).is_some());
    }

    #[tokio::test]
    async fn progress_is_reported_in_order() {
        let f = fixture(with_template("{{url}}"), MemoryOutbox::new());
        f.handler.process(request()).await.expect("process failed");

        let events = f.sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], r#"PlaceholdersFound { names: ["url"] }"#);
        assert!(events[1].starts_with("EmailSent"));
        assert!(events[2].starts_with("ArtifactSaved"));
    }
}
