//! In-process collaborators for tests and local runs

use crate::{email::EmailService, store::ObjectStore, BoxError};
use async_trait::async_trait;
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An object held by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object contents.
    pub bytes: Vec<u8>,
    /// Content type given on upload.
    pub content_type: String,
}

/// Object store backed by a map of `(bucket, key)` pairs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
    reject_writes: bool,
}

impl MemoryStore {
    /// An empty store accepting writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `put` always fails.
    pub fn rejecting_writes() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    /// Seed an object, builder style.
    pub fn with_object(self, bucket: &str, key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(bucket, key, bytes);
        self
    }

    /// Seed an object.
    pub fn insert(&self, bucket: &str, key: &str, bytes: impl Into<Vec<u8>>) {
        lock(&self.objects).insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes: bytes.into(),
                content_type: "application/octet-stream".to_string(),
            },
        );
    }

    /// The object at `key` in `bucket`, if any.
    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        lock(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Every key held in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        lock(&self.objects)
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BoxError> {
        self.object(bucket, key)
            .map(|object| object.bytes)
            .ok_or_else(|| format!("NoSuchKey: {}/{}", bucket, key).into())
    }

    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BoxError> {
        if self.reject_writes {
            return Err(format!("AccessDenied: {}/{}", bucket, key).into());
        }
        lock(&self.objects).insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

/// A message accepted by a [`MemoryOutbox`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Email service that records messages instead of delivering them.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    sent: Mutex<Vec<SentMessage>>,
    failure: Option<String>,
}

impl MemoryOutbox {
    /// An outbox accepting every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// An outbox rejecting every message with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl EmailService for MemoryOutbox {
    async fn send(&self, from: &str, to: &str, subject: &str, html: &str) -> Result<(), BoxError> {
        if let Some(reason) = &self.failure {
            return Err(reason.clone().into());
        }
        lock(&self.sent).push(SentMessage {
            from: from.to_string(),
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}
