use async_trait::async_trait;
use aws_sdk_sesv2::{
    error::DisplayErrorContext,
    types::{Body, Content, Destination, EmailContent, Message},
    Client,
};
use template_mailer::{BoxError, EmailService};

/// Email service backed by an SES v2 client.
#[derive(Debug, Clone)]
pub struct SesMailer {
    client: Client,
}

impl SesMailer {
    /// Wrap an SES v2 client. The sender passed to `send` must be a verified
    /// identity.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn content(data: &str) -> Result<Content, BoxError> {
    Ok(Content::builder().data(data).charset("UTF-8").build()?)
}

#[async_trait]
impl EmailService for SesMailer {
    async fn send(&self, from: &str, to: &str, subject: &str, html: &str) -> Result<(), BoxError> {
        let destination = Destination::builder().to_addresses(to).build();
        let message = Message::builder()
            .subject(content(subject)?)
            .body(Body::builder().html(content(html)?).build())
            .build();

        self.client
            .send_email()
            .from_email_address(from)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| DisplayErrorContext(e).to_string())?;
        Ok(())
    }
}
