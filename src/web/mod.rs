//! Web server for check-in, prize administration and the live display
//!
//! Serves the JSON API and the realtime viewer channels.

mod api;
mod extract;
mod server;
mod viewer;

pub use server::{start_web_server, AppState, ServerConfig};
