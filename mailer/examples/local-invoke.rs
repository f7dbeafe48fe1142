use serde_json::json;
use std::sync::Arc;
use template_mailer::{
    config::DEFAULT_BUCKET,
    memory::{MemoryOutbox, MemoryStore},
    MailerConfig, RequestHandler,
};

// Runs one invocation against in-memory collaborators and prints the
// response, the message that would have been sent and the stored keys.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let template_key = MailerConfig::default().template_key("5a3f1e2u1r.html");
    let store = Arc::new(MemoryStore::new().with_object(
        DEFAULT_BUCKET,
        &template_key,
        r#"<p>Hello {{firstName}}, your link is <a href="{{url}}">{{url}}</a></p>"#,
    ));
    let outbox = Arc::new(MemoryOutbox::new());
    let handler = RequestHandler::new(Arc::clone(&store), Arc::clone(&outbox));

    let event = json!({
        "template_id": "5a3f1e2u1r.html",
        "firstName": "perumal",
        "emailaddress": "perumal@example.com",
        "url": "https://www.google.com/",
    });

    let response = handler.handle(event).await;
    println!("{}", serde_json::to_string_pretty(&response).expect("unable to serialize response"));
    for message in outbox.sent() {
        println!("to {}: {}", message.to, message.html);
    }
    for key in store.keys(DEFAULT_BUCKET) {
        println!("stored {}", key);
    }
}
