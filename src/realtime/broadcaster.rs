//! Registry of live viewer connections and event fan-out.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use super::events::ViewerEvent;

/// Channel sender half for pushing events to one viewer
pub type ViewerSender = mpsc::UnboundedSender<ViewerEvent>;

/// Fans events out to every registered viewer.
///
/// No acknowledgment and no replay: a viewer only sees events sent while it is registered.
pub struct Broadcaster {
    viewers: RwLock<HashMap<String, ViewerSender>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            viewers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a viewer and return the receiver its transport should drain
    pub fn register(&self, conn_id: &str) -> mpsc::UnboundedReceiver<ViewerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.viewers.write().insert(conn_id.to_string(), tx);
        rx
    }

    pub fn unregister(&self, conn_id: &str) {
        self.viewers.write().remove(conn_id);
    }

    /// Send an event to all viewers, returning how many accepted it.
    ///
    /// Iterates a snapshot so viewers can connect or leave mid-broadcast.
    pub fn broadcast(&self, event: ViewerEvent) -> usize {
        let snapshot: Vec<(String, ViewerSender)> = self
            .viewers
            .read()
            .iter()
            .map(|(id, tx)| (id.clone(), tx.clone()))
            .collect();

        let mut delivered = 0;
        for (conn_id, tx) in snapshot {
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                debug!(conn_id = %conn_id, "Viewer channel closed, skipping");
            }
        }
        debug!(event = event.name(), delivered, "Broadcast event");
        delivered
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.read().len()
    }

    /// Drop every sender so each transport sees its channel end and closes
    pub fn close_all(&self) -> usize {
        let mut viewers = self.viewers.write();
        let count = viewers.len();
        viewers.clear();
        count
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared broadcaster type
pub type SharedBroadcaster = Arc<Broadcaster>;

pub fn create_shared_broadcaster() -> SharedBroadcaster {
    Arc::new(Broadcaster::new())
}
