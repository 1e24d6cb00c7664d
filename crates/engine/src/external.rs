//! # External Collaborators
//!
//! Object storage, postal-code address lookup and notification delivery
//! live outside the engine. The engine depends on these traits only;
//! concrete implementations are wired in at startup. Notification failures
//! are logged and never propagate into the triggering operation.

use std::path::PathBuf;

use async_trait::async_trait;
use error::{AppError, Result};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

/// Stores uploaded blobs (avatars and the like) and hands back display
/// URLs. Nothing in the engine reads blobs back.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<String>;
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Advisory postal-code enrichment for profile forms.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn lookup(&self, postal_code: &str) -> Result<Option<Address>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city:   String,
    pub region: String,
}

/// Fire-and-forget user notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, user_id: Uuid, message: &str, context: &str) -> Result<()>;
}

/// Deliver a notification, swallowing and logging any failure.
pub async fn notify_best_effort(sink: &dyn NotificationSink, user_id: Uuid, message: &str, context: &str) {
    if let Err(err) = sink.notify(user_id, message, context).await {
        warn!(user_id = %user_id, context, error = %err, "Notification delivery failed");
    }
}

/// Filesystem-backed object storage. Paths are confined to a root
/// directory; the returned URL is the public prefix joined with the path.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root:       PathBuf,
    url_prefix: String,
}

impl LocalObjectStorage {
    #[must_use]
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root,
            url_prefix,
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        if path.is_empty() || path.starts_with('/') || path.split('/').any(|seg| seg == "..") {
            return Err(AppError::validation("Invalid storage path"));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        debug!(path, "Object stored");
        Ok(format!("{}/{}", self.url_prefix.trim_end_matches('/'), path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// HTTP postal-code lookup client. A non-success status or an unparseable
/// body yields `None`; the enrichment is advisory and callers proceed
/// without it.
#[derive(Debug, Clone)]
pub struct HttpAddressLookup {
    client:   reqwest::Client,
    base_url: String,
}

impl HttpAddressLookup {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl AddressLookup for HttpAddressLookup {
    async fn lookup(&self, postal_code: &str) -> Result<Option<Address>> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), postal_code);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Address lookup request failed: {e}")))?;
        if !response.status().is_success() {
            debug!(postal_code, status = %response.status(), "Address lookup miss");
            return Ok(None);
        }
        match response.json::<Address>().await {
            Ok(address) => Ok(Some(address)),
            Err(err) => {
                warn!(postal_code, error = %err, "Address lookup returned an unparseable body");
                Ok(None)
            },
        }
    }
}

/// Default notification sink: writes the notification to the log. Real
/// delivery (email, push) is a deployment concern behind the same trait.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, user_id: Uuid, message: &str, context: &str) -> Result<()> {
        tracing::info!(user_id = %user_id, context, message, "Notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_storage_path_confinement() {
        let storage = LocalObjectStorage::new(PathBuf::from("/var/lib/rally"), "https://cdn.example".to_string());
        assert!(storage.resolve("avatars/u1.png").is_ok());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert!(storage.resolve("a/../../secret").is_err());
        assert!(storage.resolve("").is_err());
    }

    #[tokio::test]
    async fn test_notify_best_effort_swallows_failures() {
        struct FailingSink(AtomicUsize);

        #[async_trait]
        impl NotificationSink for FailingSink {
            async fn notify(&self, _user_id: Uuid, _message: &str, _context: &str) -> Result<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(AppError::internal("sink down"))
            }
        }

        let sink = FailingSink(AtomicUsize::new(0));
        notify_best_effort(&sink, Uuid::new_v4(), "hello", "team_joined").await;
        assert_eq!(sink.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_log_notifier_is_infallible() {
        let sink = LogNotifier;
        assert!(sink.notify(Uuid::new_v4(), "hi", "test").await.is_ok());
    }
}
