pub mod document;
pub mod store;

pub use document::{DisplayConfig, Prize, User, WinnerRecord};
pub use store::{create_shared_store, SharedStore, Store};
