use std::{env, path::PathBuf};

use babyreveal_core::random_string;
use babyreveal_server::DEFAULT_PORT;
use log::{info, warn};

use crate::AppError;

const SECRET_LENGTH: usize = 64;

/// Settings read from the environment at startup
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub admin_password: Option<String>,
    pub token_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let port = match var("BABYREVEAL_PORT") {
            Some(port) => port.parse::<u16>().map_err(|_| {
                AppError::Config(format!("BABYREVEAL_PORT must be a port number, got {port}"))
            })?,
            None => DEFAULT_PORT,
        };

        let data_dir = var("BABYREVEAL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let admin_password = var("ADMIN_PASSWORD");
        if admin_password.is_none() {
            warn!("ADMIN_PASSWORD is not set, admin login is disabled");
        }

        let token_secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET is not set, admin sessions will not survive a restart");
            random_string(SECRET_LENGTH)
        });

        info!("Using data directory {}", data_dir.display());

        Ok(Self {
            port,
            data_dir,
            admin_password,
            token_secret,
        })
    }
}

/// Empty variables count as unset
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
