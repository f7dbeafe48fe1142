#![warn(missing_docs)]

//! Template mailer for AWS Lambda style invocations.
//!
//! A single [`RequestHandler`] takes one invocation event, fills a stored HTML
//! template with the fields supplied in the event, emails the result and keeps
//! an audit copy in the object store.
//!
//! The handler talks to the outside world only through the [`ObjectStore`],
//! [`EmailService`] and [`EventSink`] traits, so it runs unchanged against the
//! AWS services in production and against the [`memory`] collaborators in
//! tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use template_mailer::{
//!     memory::{MemoryOutbox, MemoryStore},
//!     RequestHandler,
//! };
//!
//! # async fn run() {
//! let store = MemoryStore::new();
//! let handler = RequestHandler::new(store, MemoryOutbox::new());
//! let response = handler
//!     .handle(json!({ "template_id": "welcome.html", "emailaddress": "jo@example.com" }))
//!     .await;
//! println!("{}", response.body);
//! # }
//! ```

pub mod config;
pub mod email;
pub mod error;
pub mod event;
pub mod handler;
pub mod memory;
pub mod response;
pub mod sink;
pub mod store;
pub mod template;

pub use crate::{
    config::MailerConfig,
    email::EmailService,
    error::MailerError,
    event::{MailRequest, Payload},
    handler::{Artifact, Delivery, RequestHandler},
    response::{HandlerResponse, IntoResponse},
    sink::{EventSink, MailerEvent, NullSink, TracingSink},
    store::ObjectStore,
    template::{RenderedDocument, Template},
};

/// Error type returned by the external collaborators.
///
/// Same shape as the Lambda runtime's `Error` alias so adapters can hand
/// SDK failures straight through with `?`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
