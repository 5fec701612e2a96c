//! Prize draws over the eligible pool.
//!
//! A user stays eligible until their first win, across all prizes.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::realtime::{DrawOutcome, SharedBroadcaster, ViewerEvent};
use crate::state::document::{current_millis, local_timestamp};
use crate::state::{SharedStore, WinnerRecord};

/// Pick up to `count` distinct items uniformly at random.
///
/// Each step takes a uniform index from what is left of `pool` and removes it,
/// so the result is a prefix of a uniform random permutation.
pub fn sample_without_replacement<T, R>(mut pool: Vec<T>, count: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    let count = count.min(pool.len());
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        let index = rng.gen_range(0..pool.len());
        picked.push(pool.swap_remove(index));
    }
    picked
}

/// Runs draws and resets
pub struct DrawManager {
    store: SharedStore,
    broadcaster: SharedBroadcaster,
    rng: Mutex<StdRng>,
}

impl DrawManager {
    pub fn new(store: SharedStore, broadcaster: SharedBroadcaster) -> Self {
        Self::with_rng(store, broadcaster, StdRng::from_entropy())
    }

    pub fn with_rng(store: SharedStore, broadcaster: SharedBroadcaster, rng: StdRng) -> Self {
        Self {
            store,
            broadcaster,
            rng: Mutex::new(rng),
        }
    }

    pub async fn list_winners(&self) -> Result<Vec<WinnerRecord>> {
        Ok(self.store.snapshot().await?.winners)
    }

    /// Draw up to `count` winners for a prize.
    ///
    /// Asking for more winners than there are eligible users returns everyone left.
    /// The document is written once per draw regardless of `count`.
    pub async fn draw(&self, prize_id: Option<i64>, count: usize) -> Result<DrawOutcome> {
        let outcome = self
            .store
            .transact(|doc| {
                let prize = prize_id
                    .and_then(|id| doc.find_prize(id))
                    .cloned()
                    .ok_or_else(|| AppError::validation("Please select a prize"))?;

                let pool: Vec<_> = doc.available_users().into_iter().cloned().collect();
                if pool.is_empty() {
                    return Err(AppError::validation("No eligible users to draw from"));
                }

                let selected = sample_without_replacement(pool, count, &mut *self.rng.lock());

                let millis = current_millis();
                let time = local_timestamp();
                let winners: Vec<WinnerRecord> = selected
                    .into_iter()
                    .enumerate()
                    .map(|(i, user)| WinnerRecord {
                        id: format!("win_{}_{}", millis, i),
                        user_id: user.id,
                        user_name: user.name,
                        user_phone: user.phone_mask,
                        prize_id: prize.id,
                        prize_name: prize.name.clone(),
                        prize_desc: prize.desc.clone(),
                        time: time.clone(),
                    })
                    .collect();

                doc.winners.extend(winners.iter().cloned());
                Ok(DrawOutcome { prize, winners })
            })
            .await?;

        info!(
            "Drew {} winner(s) for prize {} ({})",
            outcome.winners.len(),
            outcome.prize.id,
            outcome.prize.name
        );
        self.broadcaster
            .broadcast(ViewerEvent::DrawResult(outcome.clone()));
        Ok(outcome)
    }

    /// Clear users and winners. Prizes and display config are kept.
    pub async fn reset(&self) -> Result<()> {
        let (users, winners) = self
            .store
            .transact(|doc| {
                let cleared = (doc.users.len(), doc.winners.len());
                doc.users.clear();
                doc.winners.clear();
                Ok(cleared)
            })
            .await?;

        info!("Data reset: cleared {} users and {} winners", users, winners);
        self.broadcaster.broadcast(ViewerEvent::DataReset);
        Ok(())
    }
}

/// Shared draw manager type
pub type SharedDrawManager = Arc<DrawManager>;

pub fn create_shared_draw_manager(
    store: SharedStore,
    broadcaster: SharedBroadcaster,
) -> SharedDrawManager {
    Arc::new(DrawManager::new(store, broadcaster))
}
