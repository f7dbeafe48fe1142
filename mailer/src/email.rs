//! Email delivery seam

use crate::BoxError;
use async_trait::async_trait;
use std::sync::Arc;

/// Service that delivers a rendered HTML message to one recipient.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Send `html` from `from` to `to` with the given subject.
    async fn send(&self, from: &str, to: &str, subject: &str, html: &str) -> Result<(), BoxError>;
}

#[async_trait]
impl<T> EmailService for Arc<T>
where
    T: EmailService + ?Sized,
{
    async fn send(&self, from: &str, to: &str, subject: &str, html: &str) -> Result<(), BoxError> {
        (**self).send(from, to, subject, html).await
    }
}
