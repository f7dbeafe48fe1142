//! Object store seam

use crate::BoxError;
use async_trait::async_trait;
use std::sync::Arc;

/// Blob storage holding templates and receiving rendered artifacts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the object stored at `key` in `bucket`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BoxError>;

    /// Store `bytes` at `key` in `bucket`, replacing any previous object.
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BoxError>;
}

#[async_trait]
impl<T> ObjectStore for Arc<T>
where
    T: ObjectStore + ?Sized,
{
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BoxError> {
        (**self).get(bucket, key).await
    }

    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BoxError> {
        (**self).put(bucket, key, bytes, content_type).await
    }
}
