use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::document::Document;
use crate::error::{AppError, Result};

/// File-backed store for the event document.
///
/// Every mutation is a full read-modify-write of the JSON file. The internal
/// mutex serializes those cycles so two requests cannot lose each other's update.
pub struct Store {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create the data directory and make sure a readable document exists
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        if let Some(dir) = store.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::StoreSave {
                    path: dir.display().to_string(),
                    source: e,
                })?;
        }

        let doc = store.snapshot().await?;
        info!(
            "Store ready at {}: {} users, {} winners, {} prizes",
            store.path.display(),
            doc.users.len(),
            doc.winners.len(),
            doc.prizes.len()
        );
        Ok(store)
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Read the document, reinitializing it when missing or corrupt
    pub async fn load(&self) -> Result<Document> {
        match self.read().await {
            Ok(doc) => Ok(doc),
            Err(AppError::StoreRead { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!("No store at {}, writing default document", self.path.display());
                self.reinitialize().await
            }
            Err(AppError::StoreParse { source, .. }) => {
                warn!(
                    "Store at {} is unreadable ({}), resetting to default document",
                    self.path.display(),
                    source
                );
                self.reinitialize().await
            }
            Err(e) => Err(e),
        }
    }

    /// Save to the JSON file atomically, replacing whatever was there
    pub async fn save(&self, doc: &Document) -> Result<()> {
        let content = serde_json::to_string_pretty(doc)?;
        let path = self.path.display().to_string();

        // Write to temp file first, then rename for atomicity
        let temp_path = format!("{}.tmp", path);
        tokio::fs::write(&temp_path, &content)
            .await
            .map_err(|e| AppError::StoreSave {
                path: path.clone(),
                source: e,
            })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| AppError::StoreSave { path, source: e })?;

        Ok(())
    }

    /// Current document, read under the store lock
    pub async fn snapshot(&self) -> Result<Document> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Run one read-modify-write cycle.
    ///
    /// The document is only written back when `f` succeeds.
    pub async fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let out = f(&mut doc)?;
        self.save(&doc).await?;
        Ok(out)
    }

    async fn read(&self) -> Result<Document> {
        let path = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| AppError::StoreRead {
                path: path.clone(),
                source: e,
            })?;
        serde_json::from_str(&content).map_err(|e| AppError::StoreParse { path, source: e })
    }

    async fn reinitialize(&self) -> Result<Document> {
        let doc = Document::seeded();
        self.save(&doc).await?;
        Ok(doc)
    }
}

/// Shared store type
pub type SharedStore = Arc<Store>;

pub fn create_shared_store(store: Store) -> SharedStore {
    Arc::new(store)
}
