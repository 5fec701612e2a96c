use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Result;
use crate::realtime::{SharedBroadcaster, ViewerEvent};
use crate::state::{DisplayConfig, SharedStore};

/// Reads and updates the big-screen display settings
pub struct ConfigManager {
    store: SharedStore,
    broadcaster: SharedBroadcaster,
}

impl ConfigManager {
    pub fn new(store: SharedStore, broadcaster: SharedBroadcaster) -> Self {
        Self { store, broadcaster }
    }

    /// Current config, writing the default back if the document has none
    pub async fn get(&self) -> Result<DisplayConfig> {
        if let Some(config) = self.store.snapshot().await?.config {
            return Ok(config);
        }

        self.store
            .transact(|doc| {
                if doc.config.is_none() {
                    warn!("Display config missing, restoring defaults");
                }
                Ok(doc.config.get_or_insert_with(DisplayConfig::default).clone())
            })
            .await
    }

    /// Change only the provided fields and broadcast the resulting config
    pub async fn update(
        &self,
        theme: Option<String>,
        display_title: Option<String>,
    ) -> Result<DisplayConfig> {
        let config = self
            .store
            .transact(|doc| {
                let config = doc.config.get_or_insert_with(DisplayConfig::default);
                if let Some(theme) = theme {
                    config.theme = theme;
                }
                if let Some(display_title) = display_title {
                    config.display_title = display_title;
                }
                Ok(config.clone())
            })
            .await?;

        info!(
            "Display config updated: theme={}, title={}",
            config.theme, config.display_title
        );
        self.broadcaster
            .broadcast(ViewerEvent::ConfigUpdate(config.clone()));
        Ok(config)
    }
}

/// Shared config manager type
pub type SharedConfigManager = Arc<ConfigManager>;

pub fn create_shared_config_manager(
    store: SharedStore,
    broadcaster: SharedBroadcaster,
) -> SharedConfigManager {
    Arc::new(ConfigManager::new(store, broadcaster))
}
