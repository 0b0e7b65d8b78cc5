//! File-backed friends register.
//!
//! [`FriendRepository`] owns its [`FriendStorage`] behind an async mutex. Each
//! load/modify/save cycle runs on the blocking pool while holding the lock, so
//! cycles never interleave, even when the calling request is dropped.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{Friend, FriendUpdate};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Friend with ID {0} already exists")]
    DuplicateId(i64),
    #[error("Friend with ID {0} not found")]
    NotFound(i64),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Whole-list persistence for friends. Implementations may block.
pub trait FriendStorage: Send + Sync {
    fn load(&self) -> Result<Vec<Friend>, RepositoryError>;
    fn save(&self, friends: &[Friend]) -> Result<(), RepositoryError>;
}

/// Stores the list as a pretty-printed JSON array. A missing file reads as empty.
///
/// Saves go to a temporary file in the same directory which then replaces the
/// target, so a failed save leaves the previous contents in place.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

impl FriendStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Friend>, RepositoryError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Vec::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, friends: &[Friend]) -> Result<(), RepositoryError> {
        let body = serde_json::to_vec_pretty(friends)?;
        let mut tmp = NamedTempFile::new_in(self.dir())?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    friends: std::sync::Mutex<Vec<Friend>>,
}

impl MemoryStorage {
    pub fn new(friends: Vec<Friend>) -> Self {
        Self {
            friends: std::sync::Mutex::new(friends),
        }
    }
}

impl FriendStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Friend>, RepositoryError> {
        Ok(self
            .friends
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, friends: &[Friend]) -> Result<(), RepositoryError> {
        *self
            .friends
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = friends.to_vec();
        Ok(())
    }
}

pub struct FriendRepository {
    storage: Arc<Mutex<Box<dyn FriendStorage>>>,
}

impl FriendRepository {
    pub fn new(storage: impl FriendStorage + 'static) -> Self {
        let storage: Box<dyn FriendStorage> = Box::new(storage);
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Runs `op` on the blocking pool. The lock travels with the task and is
    /// released only when `op` returns.
    async fn with_storage<T, F>(&self, op: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&dyn FriendStorage) -> Result<T, RepositoryError> + Send + 'static,
        T: Send + 'static,
    {
        let guard = Arc::clone(&self.storage).lock_owned().await;
        tokio::task::spawn_blocking(move || op(&**guard)).await?
    }

    /// All friends ordered by id.
    pub async fn all(&self) -> Result<Vec<Friend>, RepositoryError> {
        self.with_storage(|storage| {
            let mut friends = storage.load()?;
            friends.sort_by_key(|f| f.id);
            Ok(friends)
        })
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Friend>, RepositoryError> {
        self.with_storage(move |storage| Ok(storage.load()?.into_iter().find(|f| f.id == id)))
            .await
    }

    pub async fn add(&self, friend: Friend) -> Result<Friend, RepositoryError> {
        let friend = self
            .with_storage(move |storage| {
                let mut friends = storage.load()?;
                if friends.iter().any(|f| f.id == friend.id) {
                    return Err(RepositoryError::DuplicateId(friend.id));
                }
                friends.push(friend.clone());
                storage.save(&friends)?;
                Ok(friend)
            })
            .await?;
        tracing::debug!(id = friend.id, "friend added");
        Ok(friend)
    }

    pub async fn update(&self, id: i64, changes: FriendUpdate) -> Result<Friend, RepositoryError> {
        let updated = self
            .with_storage(move |storage| {
                let mut friends = storage.load()?;
                let friend = friends
                    .iter_mut()
                    .find(|f| f.id == id)
                    .ok_or(RepositoryError::NotFound(id))?;
                changes.apply(friend);
                let updated = friend.clone();
                storage.save(&friends)?;
                Ok(updated)
            })
            .await?;
        tracing::debug!(id, "friend updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        self.with_storage(move |storage| {
            let mut friends = storage.load()?;
            let before = friends.len();
            friends.retain(|f| f.id != id);
            if friends.len() == before {
                return Err(RepositoryError::NotFound(id));
            }
            storage.save(&friends)
        })
        .await?;
        tracing::debug!(id, "friend deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn friend(id: i64, name: &str) -> Friend {
        Friend {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            status: "Active".to_string(),
        }
    }

    #[tokio::test]
    async fn test_all_sorted_by_id() {
        let repo = FriendRepository::new(MemoryStorage::new(vec![
            friend(3, "Cecilia"),
            friend(1, "Anna"),
            friend(2, "Bertil"),
        ]));
        let ids: Vec<i64> = repo.all().await.unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_add_rejects_duplicate_id() {
        let repo = FriendRepository::new(MemoryStorage::default());
        repo.add(friend(1, "Anna")).await.unwrap();
        let err = repo.add(friend(1, "Other")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateId(1)));
        assert_eq!(repo.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_provided_fields() {
        let repo = FriendRepository::new(MemoryStorage::new(vec![friend(1, "Anna")]));
        let updated = repo
            .update(
                1,
                FriendUpdate {
                    status: Some("Busy".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Anna");
        assert_eq!(updated.status, "Busy");
        assert_eq!(repo.get(1).await.unwrap().unwrap().status, "Busy");

        let err = repo.update(9, FriendUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(9)));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = FriendRepository::new(MemoryStorage::new(vec![friend(1, "Anna")]));
        repo.delete(1).await.unwrap();
        assert!(repo.get(1).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(1).await.unwrap_err(),
            RepositoryError::NotFound(1)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let repo = Arc::new(FriendRepository::new(MemoryStorage::default()));
        let tasks: Vec<_> = (0..20)
            .map(|id| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.add(friend(id, "Friend")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(repo.all().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_json_file_storage_round_trip() {
        let file = NamedTempFile::with_suffix(".json").unwrap();
        let storage = JsonFileStorage::new(file.path());
        assert!(storage.load().unwrap().is_empty());

        let repo = FriendRepository::new(storage.clone());
        repo.add(friend(7, "Gustav")).await.unwrap();

        let reloaded = JsonFileStorage::new(file.path()).load().unwrap();
        assert_eq!(reloaded, vec![friend(7, "Gustav")]);
    }

    #[test]
    fn test_json_file_storage_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("friends.json"));
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_json_file_storage_corrupt_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "not json").unwrap();
        let err = JsonFileStorage::new(file.path()).load().unwrap_err();
        assert!(matches!(err, RepositoryError::Json(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_to_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("friends.json");
        let repo = Arc::new(FriendRepository::new(JsonFileStorage::new(&path)));
        let tasks: Vec<_> = (0..20)
            .map(|id| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.add(friend(id, "Friend")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = JsonFileStorage::new(&path).load().unwrap();
        assert_eq!(stored.len(), 20);
    }

    #[test]
    fn test_json_file_save_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("friends.json");
        fs::write(&path, "[]").unwrap();

        let storage = JsonFileStorage::new(&path);
        storage.save(&[friend(1, "Anna")]).unwrap();
        storage.save(&[friend(2, "Bertil")]).unwrap();

        assert_eq!(storage.load().unwrap(), vec![friend(2, "Bertil")]);
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary files must not be left behind");
    }

    #[test]
    fn test_json_file_failed_save_keeps_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("friends.json");
        let storage = JsonFileStorage::new(&path);
        storage.save(&[friend(1, "Anna")]).unwrap();

        // no temp file can be created in a directory that does not exist
        let blocked = JsonFileStorage::new(dir.path().join("missing").join("friends.json"));
        assert!(matches!(
            blocked.save(&[friend(2, "Bertil")]).unwrap_err(),
            RepositoryError::Io(_)
        ));
        assert_eq!(storage.load().unwrap(), vec![friend(1, "Anna")]);
    }
}
