use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::state::document::current_millis;
use crate::state::{Prize, SharedStore};

/// CRUD over prize definitions
pub struct PrizeManager {
    store: SharedStore,
}

impl PrizeManager {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Prize>> {
        Ok(self.store.snapshot().await?.prizes)
    }

    pub async fn get(&self, id: i64) -> Result<Prize> {
        self.store
            .snapshot()
            .await?
            .find_prize(id)
            .cloned()
            .ok_or_else(|| prize_not_found(id))
    }

    /// Add a prize. Ids are derived from the current time in milliseconds.
    pub async fn create(&self, name: Option<&str>, desc: Option<&str>) -> Result<Prize> {
        let name = require_name(name)?;

        let prize = self
            .store
            .transact(|doc| {
                // Keep ids unique when two creates land in the same millisecond
                let last = doc.prizes.iter().map(|p| p.id).max().unwrap_or(0);
                let prize = Prize::new(current_millis().max(last + 1), name, desc.unwrap_or(""));
                doc.prizes.push(prize.clone());
                Ok(prize)
            })
            .await?;

        info!("Prize {} created: {}", prize.id, prize.name);
        Ok(prize)
    }

    pub async fn update(&self, id: i64, name: Option<&str>, desc: Option<&str>) -> Result<Prize> {
        let name = require_name(name)?;

        let prize = self
            .store
            .transact(|doc| {
                let prize = doc
                    .prizes
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| prize_not_found(id))?;
                prize.name = name.to_string();
                prize.desc = desc.unwrap_or("").to_string();
                Ok(prize.clone())
            })
            .await?;

        info!("Prize {} updated: {}", prize.id, prize.name);
        Ok(prize)
    }

    /// Remove a prize. Unknown ids are not an error.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let removed = self
            .store
            .transact(|doc| {
                let before = doc.prizes.len();
                doc.prizes.retain(|p| p.id != id);
                Ok(before - doc.prizes.len())
            })
            .await?;

        info!("Prize {} deleted ({} removed)", id, removed);
        Ok(())
    }
}

fn require_name(name: Option<&str>) -> Result<&str> {
    name.filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::validation("Please enter a prize name"))
}

fn prize_not_found(id: i64) -> AppError {
    AppError::NotFound {
        entity: "Prize",
        id: id.to_string(),
    }
}

/// Shared prize manager type
pub type SharedPrizeManager = Arc<PrizeManager>;

pub fn create_shared_prize_manager(store: SharedStore) -> SharedPrizeManager {
    Arc::new(PrizeManager::new(store))
}
