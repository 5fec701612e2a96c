use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{error, info};

/// Event check-in and prize draw server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0")]
    bind_addr: String,

    /// JSON file holding users, prizes, winners and display config
    #[arg(long, env = "DATA_FILE", default_value = "data/data.json")]
    data_file: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

mod error;
mod logging;
mod managers;
mod realtime;
mod state;
mod web;

use realtime::create_shared_broadcaster;
use state::{create_shared_store, Store};
use web::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    logging::init(&args.log_level);

    info!("Opening store at {}...", args.data_file.display());
    let store = create_shared_store(Store::open(args.data_file.clone()).await?);
    let broadcaster = create_shared_broadcaster();
    let state = AppState::new(store, broadcaster);

    let config = ServerConfig {
        bind_addr: args.bind_addr,
        port: args.port,
        data_file: args.data_file,
    };

    if let Err(e) = web::start_web_server(config, state).await {
        error!("Web server error: {}", e);
        return Err(e);
    }
    info!("Server stopped.");

    Ok(())
}
