use async_trait::async_trait;
use thiserror::Error;

use crate::{AppConfig, ConfigPatch, NewVote, Vote};

mod file;
pub use file::*;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The document could not be written to disk
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Could not serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Represents a place votes and the event config can be persisted to.
///
/// Reads never fail: a missing or unreadable document reads as empty (votes)
/// or as the defaults (config). Writes report their failure to the caller.
#[async_trait]
pub trait Storage: Send + Sync {
    /// All votes, newest first
    async fn votes(&self) -> Vec<Vote>;
    async fn add_vote(&self, new_vote: NewVote) -> Result<Vote>;
    async fn clear_votes(&self) -> Result<()>;

    /// The stored config merged over the defaults
    async fn config(&self) -> AppConfig;
    async fn save_config(&self, patch: ConfigPatch) -> Result<AppConfig>;
}
