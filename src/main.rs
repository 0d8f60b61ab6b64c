use babyreveal_core::{Auth, FileStorage, Reveal, StoreError};
use babyreveal_server::ServerContext;
use colored::Colorize;
use log::{error, info};
use thiserror::Error;

use crate::config::Config;

mod config;
mod logging;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Could not open data directory: {0}")]
    Storage(#[from] StoreError),

    #[error("Server stopped: {0}")]
    Server(#[from] std::io::Error),
}

impl AppError {
    fn hint(&self) -> String {
        match self {
            AppError::Config(_) => {
                "Check the BABYREVEAL_* environment variables and try again.".to_string()
            }
            AppError::Storage(_) => {
                "Make sure BABYREVEAL_DATA_DIR points to a writable location.".to_string()
            }
            AppError::Server(_) => {
                "The port may already be in use. Set BABYREVEAL_PORT to another port.".to_string()
            }
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let storage = FileStorage::open(&config.data_dir).await?;
    let auth = Auth::new(config.admin_password, &config.token_secret);

    let context = ServerContext::new(Reveal::new(storage, auth));

    info!("Initialized successfully.");
    babyreveal_server::run_server(context, config.port).await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = logging::init_logger(logging::level_from_env()) {
        eprintln!("Could not initialize logging: {e}");
    }

    if let Err(error) = run().await {
        error!(
            "{} Read the error below to troubleshoot the issue.",
            "babyreveal failed!".bold().red()
        );
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());
    }
}
