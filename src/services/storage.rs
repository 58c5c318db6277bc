//! Object storage for uploaded receipts and attachments.
//!
//! The only contract is "bytes in, `{url, key}` out" plus deletion by key. Deletion
//! failures never reach the client: callers go through [`discard`].

use crate::{
    config::settings::UploadConfig,
    errors::{Error, Result},
};
use async_trait::async_trait;
use rand::{Rng, distributions::Alphanumeric};
use serde::Serialize;
use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    /// Public URL of the object
    pub url: String,
    /// Identifier used to delete it
    pub key: String,
}

/// A place uploads are written to.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `folder`, keeping the extension of `file_name`.
    async fn put(&self, folder: &str, file_name: &str, bytes: &[u8]) -> Result<StoredObject>;

    /// Removes the object identified by `key`.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Stores objects as files below a directory that the HTTP layer serves statically.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalObjectStore {
    /// Creates a store rooted at `config.directory`.
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            root: config.directory.clone(),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !safe || key.is_empty() {
            return Err(Error::validation(format!("Invalid object key: {key}")));
        }
        Ok(self.root.join(relative))
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(char::is_alphanumeric))
        .map(str::to_ascii_lowercase)
}

fn object_key(folder: &str, file_name: &str) -> String {
    let stem: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    match extension_of(file_name) {
        Some(ext) => format!("{folder}/{stamp}-{stem}.{ext}"),
        None => format!("{folder}/{stamp}-{stem}"),
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, folder: &str, file_name: &str, bytes: &[u8]) -> Result<StoredObject> {
        if bytes.is_empty() {
            return Err(Error::validation("Uploaded file is empty"));
        }

        let key = object_key(folder, file_name);
        let path = self.resolve(&key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::info!("Stored upload {} ({} bytes)", key, bytes.len());
        Ok(StoredObject {
            url: format!("{}/{}", self.public_prefix, key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}

/// Deletes an object, logging but otherwise ignoring a failure.
pub async fn discard(store: &Arc<dyn ObjectStore>, key: Option<&str>) {
    let Some(key) = key else {
        return;
    };
    if let Err(e) = store.delete(key).await {
        tracing::warn!("Failed to delete stored object {}: {}", key, e);
    }
}
