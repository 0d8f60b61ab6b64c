use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use log::{error, info, warn};
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};

use super::{Result, Storage};
use crate::{AppConfig, ConfigPatch, NewVote, Vote};

const VOTES_FILE: &str = "votes.json";
const CONFIG_FILE: &str = "config.json";

enum Loaded<T> {
    Missing,
    Parsed(T),
    Malformed,
}

/// Stores votes and config as two JSON documents inside a data directory.
///
/// Every write replaces the whole document. Read-modify-write sequences are
/// serialized per document, so concurrent requests cannot lose each other's updates.
pub struct FileStorage {
    dir: PathBuf,
    votes_lock: Mutex<()>,
    config_lock: Mutex<()>,
}

impl FileStorage {
    /// Opens the storage, creating the data directory if it doesn't exist
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if fs::metadata(&dir).await.is_err() {
            info!("Creating data directory {}", dir.display());
        }

        fs::create_dir_all(&dir).await?;

        Ok(Self {
            dir,
            votes_lock: Mutex::new(()),
            config_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn load<T>(&self, name: &str) -> Loaded<T>
    where
        T: DeserializeOwned,
    {
        let path = self.dir.join(name);

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Loaded::Missing,
            Err(e) => {
                error!("Could not read {}: {}", path.display(), e);
                return Loaded::Missing;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(document) => Loaded::Parsed(document),
            Err(e) => {
                warn!("Ignoring malformed {}: {}", path.display(), e);
                Loaded::Malformed
            }
        }
    }

    async fn read_document<T>(&self, name: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match self.load(name).await {
            Loaded::Parsed(document) => Some(document),
            Loaded::Missing | Loaded::Malformed => None,
        }
    }

    /// Reads a document that is about to be rewritten.
    ///
    /// A malformed document is moved aside first so its contents survive the rewrite.
    async fn read_for_update<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.load(name).await {
            Loaded::Parsed(document) => Ok(Some(document)),
            Loaded::Missing => Ok(None),
            Loaded::Malformed => {
                let path = self.dir.join(name);
                let aside = self.dir.join(format!(
                    "{name}.{}.corrupt",
                    Utc::now().timestamp_millis()
                ));

                fs::rename(&path, &aside).await?;
                error!(
                    "Moved malformed {} to {} before overwriting it",
                    path.display(),
                    aside.display()
                );

                Ok(None)
            }
        }
    }

    async fn write_document<T>(&self, name: &str, document: &T) -> Result<()>
    where
        T: Serialize,
    {
        let contents = serde_json::to_string_pretty(document)?;

        fs::create_dir_all(&self.dir).await?;

        // Renaming over the target keeps readers from seeing a partial document
        let path = self.dir.join(name);
        let temporary = self.dir.join(format!(".{name}.tmp"));

        fs::write(&temporary, contents).await?;
        fs::rename(&temporary, &path).await?;

        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn votes(&self) -> Vec<Vote> {
        self.read_document(VOTES_FILE).await.unwrap_or_default()
    }

    async fn add_vote(&self, new_vote: NewVote) -> Result<Vote> {
        let _guard = self.votes_lock.lock().await;

        let mut votes: Vec<Vote> = self
            .read_for_update(VOTES_FILE)
            .await?
            .unwrap_or_default();
        let timestamp = Utc::now().timestamp_millis();

        // Newest vote is first and holds the highest id
        let id = match votes.first() {
            Some(newest) => timestamp.max(newest.id.saturating_add(1)),
            None => timestamp,
        };

        let vote = new_vote.into_vote(id, timestamp);
        votes.insert(0, vote.clone());

        self.write_document(VOTES_FILE, &votes)
            .await
            .map_err(|e| {
                error!("Could not save votes: {}", e);
                e
            })?;

        Ok(vote)
    }

    async fn clear_votes(&self) -> Result<()> {
        let _guard = self.votes_lock.lock().await;

        self.write_document(VOTES_FILE, &Vec::<Vote>::new()).await
    }

    async fn config(&self) -> AppConfig {
        self.read_document(CONFIG_FILE).await.unwrap_or_default()
    }

    async fn save_config(&self, patch: ConfigPatch) -> Result<AppConfig> {
        let _guard = self.config_lock.lock().await;

        let mut config: AppConfig = self
            .read_for_update(CONFIG_FILE)
            .await?
            .unwrap_or_default();
        config.apply(patch);

        self.write_document(CONFIG_FILE, &config)
            .await
            .map_err(|e| {
                error!("Could not save config: {}", e);
                e
            })?;

        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use std::{path::PathBuf, sync::Arc};

    use crate::{random_string, Gender};

    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("babyreveal-store-{}", random_string(12)))
    }

    async fn storage() -> FileStorage {
        FileStorage::open(temp_dir()).await.unwrap()
    }

    #[tokio::test]
    async fn open_creates_directory() {
        let dir = temp_dir().join("nested");
        FileStorage::open(&dir).await.unwrap();

        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn fresh_storage_is_empty() {
        let storage = storage().await;

        assert!(storage.votes().await.is_empty());
        assert_eq!(storage.config().await, AppConfig::default());
    }

    #[tokio::test]
    async fn votes_are_newest_first() {
        let storage = storage().await;
        let names = ["ada", "bea", "cleo", "dora", "elle"];

        let mut created = vec![];
        for name in names {
            created.push(storage.add_vote(NewVote::new(name, Gender::Girl)).await.unwrap());
        }

        let votes = storage.votes().await;
        let stored_names: Vec<_> = votes.iter().map(|v| v.name.as_str()).collect();

        assert_eq!(stored_names, vec!["elle", "dora", "cleo", "bea", "ada"]);
        assert!(
            votes.windows(2).all(|pair| pair[0].id > pair[1].id),
            "ids should strictly decrease from newest to oldest"
        );

        created.reverse();
        assert_eq!(votes, created);
    }

    #[tokio::test]
    async fn added_vote_has_no_extra_fields() {
        let storage = storage().await;
        let vote = storage
            .add_vote(NewVote::new("Alice", Gender::Girl))
            .await
            .unwrap();

        assert_eq!(vote.choice, Gender::Girl);
        assert_eq!(vote.email, None);
        assert!(vote.predictions.is_empty());
        assert!(vote.timestamp > 0);
    }

    #[tokio::test]
    async fn concurrent_votes_are_not_lost() {
        let storage = Arc::new(storage().await);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage
                        .add_vote(NewVote::new(format!("guest {i}"), Gender::Boy))
                        .await
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        let votes = storage.votes().await;
        assert_eq!(votes.len(), 20);

        let mut ids: Vec<_> = votes.iter().map(|v| v.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 20, "ids should be unique");
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let storage = storage().await;
        storage.add_vote(NewVote::new("Alice", Gender::Girl)).await.unwrap();

        for _ in 0..3 {
            storage.clear_votes().await.unwrap();
            assert!(storage.votes().await.is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_documents_read_as_empty() {
        let storage = storage().await;

        std::fs::write(storage.dir().join(VOTES_FILE), "not json").unwrap();
        std::fs::write(storage.dir().join(CONFIG_FILE), "{ broken").unwrap();

        assert!(storage.votes().await.is_empty());
        assert_eq!(storage.config().await, AppConfig::default());
    }

    fn set_aside(storage: &FileStorage, name: &str) -> Vec<String> {
        std::fs::read_dir(storage.dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                let file_name = path.file_name().unwrap().to_string_lossy();
                file_name.starts_with(&format!("{name}.")) && file_name.ends_with(".corrupt")
            })
            .map(|path| std::fs::read_to_string(path).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn malformed_documents_are_kept_before_overwrite() {
        let storage = storage().await;
        let broken_votes = r#"[{ "id": 1, "name": "Old", "choice": "girl", "timestamp": 1, "weight": 3400.5 }]"#;

        std::fs::write(storage.dir().join(VOTES_FILE), broken_votes).unwrap();
        std::fs::write(storage.dir().join(CONFIG_FILE), "{ broken").unwrap();

        storage.add_vote(NewVote::new("Alice", Gender::Girl)).await.unwrap();
        storage.save_config(ConfigPatch::default()).await.unwrap();

        assert_eq!(storage.votes().await.len(), 1);
        assert_eq!(storage.config().await, AppConfig::default());
        assert_eq!(set_aside(&storage, VOTES_FILE), vec![broken_votes.to_string()]);
        assert_eq!(set_aside(&storage, CONFIG_FILE), vec!["{ broken".to_string()]);
    }

    #[tokio::test]
    async fn largest_id_does_not_overflow() {
        let storage = storage().await;
        std::fs::write(
            storage.dir().join(VOTES_FILE),
            format!(r#"[{{ "id": {}, "name": "Max", "choice": "boy", "timestamp": 1 }}]"#, i64::MAX),
        )
        .unwrap();

        let vote = storage.add_vote(NewVote::new("Alice", Gender::Girl)).await.unwrap();

        assert_eq!(vote.id, i64::MAX);
        assert_eq!(storage.votes().await.len(), 2);
    }

    #[tokio::test]
    async fn stored_config_is_merged_over_defaults() {
        let storage = storage().await;
        std::fs::write(
            storage.dir().join(CONFIG_FILE),
            r#"{ "babyName": "Lou", "unknownKey": 1 }"#,
        )
        .unwrap();

        let config = storage.config().await;

        assert_eq!(config.baby_name, "Lou");
        assert_eq!(config.girl_color, AppConfig::default().girl_color);
    }

    #[tokio::test]
    async fn saved_patches_accumulate() {
        let storage = storage().await;

        let first = ConfigPatch {
            baby_name: Some("Lou".to_string()),
            actual_weight: Some(Some(3300)),
            ..Default::default()
        };
        let second = ConfigPatch {
            is_revealed: Some(true),
            actual_gender: Some(Some(Gender::Girl)),
            ..Default::default()
        };

        storage.save_config(first.clone()).await.unwrap();
        let saved = storage.save_config(second.clone()).await.unwrap();

        let mut expected = AppConfig::default();
        expected.apply(first);
        expected.apply(second);

        assert_eq!(saved, expected);
        assert_eq!(storage.config().await, expected);
    }

    #[tokio::test]
    async fn write_failures_propagate() {
        let dir = temp_dir();
        let storage = FileStorage::open(&dir).await.unwrap();

        // Replace the data directory with a plain file so writes fail
        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, "").unwrap();

        assert!(storage.add_vote(NewVote::new("Alice", Gender::Girl)).await.is_err());
        assert!(storage.clear_votes().await.is_err());
        assert!(storage.save_config(ConfigPatch::default()).await.is_err());

        assert!(storage.votes().await.is_empty());
    }
}
