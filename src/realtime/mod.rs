//! Realtime fan-out to admin and display screens

pub mod broadcaster;
pub mod events;

pub use broadcaster::{create_shared_broadcaster, Broadcaster, SharedBroadcaster};
pub use events::{DrawOutcome, ViewerEvent};
