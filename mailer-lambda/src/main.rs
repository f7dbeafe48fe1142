use aws_config::BehaviorVersion;
use lamedh_runtime::{handler_fn, run, Context, Error};
use serde_json::Value;
use std::sync::Arc;
use template_mailer::RequestHandler;
use template_mailer_lambda::{S3Store, SesMailer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let handler = Arc::new(RequestHandler::new(
        S3Store::new(aws_sdk_s3::Client::new(&config)),
        SesMailer::new(aws_sdk_sesv2::Client::new(&config)),
    ));

    // every outcome, failures included, is reported as a response
    run(handler_fn(move |event: Value, _: Context| {
        let handler = Arc::clone(&handler);
        async move { Ok::<_, Error>(handler.handle(event).await) }
    }))
    .await?;
    Ok(())
}
