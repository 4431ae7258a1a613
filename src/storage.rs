use crate::errors::ClientError;
use crate::models::UserProfile;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const EDIT_TASK_KEY: &str = "editTaskId";

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/client.json"))
}

/// String key/value storage shared by every page of the client.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
    async fn remove(&self, key: &str) -> Result<(), ClientError>;
}

type Entries = BTreeMap<String, String>;

/// Storage kept in memory only. `disabled()` behaves like storage the user
/// has switched off: every access fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
    disabled: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self {
            entries: Mutex::default(),
            disabled: true,
        }
    }

    fn check(&self) -> Result<(), ClientError> {
        if self.disabled {
            return Err(ClientError::storage("storage is disabled"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        self.check()?;
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.check()?;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.check()?;
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON object on disk, rewritten on every change.
/// Memory only reflects a change once the file write succeeded.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Entries>,
    fault: Option<String>,
}

impl FileStore {
    /// A missing file is an empty store and a corrupt one is discarded. Any
    /// other read failure leaves the store unusable.
    pub async fn open(path: &Path) -> Self {
        let (entries, fault) = match fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => (entries, None),
                Err(err) => {
                    error!("failed to parse storage file: {err}");
                    (Entries::default(), None)
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => (Entries::default(), None),
            Err(err) => {
                error!("failed to read storage file: {err}");
                (Entries::default(), Some(err.to_string()))
            }
        };

        Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
            fault,
        }
    }

    fn check(&self) -> Result<(), ClientError> {
        match &self.fault {
            Some(fault) => Err(ClientError::storage(fault)),
            None => Ok(()),
        }
    }

    async fn persist(&self, entries: &Entries) -> Result<(), ClientError> {
        let payload = serde_json::to_vec_pretty(entries).map_err(ClientError::storage)?;
        fs::write(&self.path, payload).await.map_err(|err| {
            error!("failed to write storage file {}: {err}", self.path.display());
            ClientError::storage(err)
        })
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        self.check()?;
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.check()?;
        let mut entries = self.entries.lock().await;
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        self.persist(&updated).await?;
        *entries = updated;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.check()?;
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.persist(&updated).await?;
        *entries = updated;
        Ok(())
    }
}

/// Typed view of the client's stored session: credential, user profile and
/// the cross-page "task to edit" handoff.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(self
            .store
            .get(TOKEN_KEY)
            .await?
            .filter(|token| !token.is_empty()))
    }

    pub async fn set_token(&self, token: &str) -> Result<(), ClientError> {
        self.store.set(TOKEN_KEY, token).await
    }

    pub async fn clear_token(&self) -> Result<(), ClientError> {
        self.store.remove(TOKEN_KEY).await
    }

    pub async fn profile(&self) -> Result<Option<UserProfile>, ClientError> {
        let Some(raw) = self.store.get(USER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(err) => {
                warn!("ignoring unreadable user profile: {err}");
                Ok(None)
            }
        }
    }

    pub async fn set_profile(&self, profile: &UserProfile) -> Result<(), ClientError> {
        let raw = serde_json::to_string(profile).map_err(ClientError::storage)?;
        self.store.set(USER_KEY, &raw).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.store.remove(TOKEN_KEY).await?;
        self.store.remove(USER_KEY).await
    }

    pub async fn set_edit_task(&self, id: i64) -> Result<(), ClientError> {
        self.store.set(EDIT_TASK_KEY, &id.to_string()).await
    }

    /// Reads and removes the edit handoff in one step.
    pub async fn take_edit_task(&self) -> Result<Option<i64>, ClientError> {
        let value = self.store.get(EDIT_TASK_KEY).await?;
        if value.is_some() {
            self.store.remove(EDIT_TASK_KEY).await?;
        }
        Ok(value.and_then(|raw| raw.parse().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("task_client_{name}_{}_{}.json", std::process::id(), nanos));
        path
    }

    #[tokio::test]
    async fn session_token_lifecycle() {
        let session = Session::in_memory();
        assert_eq!(session.token().await.unwrap(), None);

        session.set_token("abc").await.unwrap();
        assert_eq!(session.token().await.unwrap().as_deref(), Some("abc"));

        session.clear_token().await.unwrap();
        assert_eq!(session.token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_token_counts_as_absent() {
        let session = Session::in_memory();
        session.set_token("").await.unwrap();
        assert_eq!(session.token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn disabled_store_reports_unavailable() {
        let session = Session::new(Arc::new(MemoryStore::disabled()));
        assert!(matches!(
            session.token().await,
            Err(ClientError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn edit_handoff_is_consumed_once() {
        let session = Session::in_memory();
        session.set_edit_task(42).await.unwrap();
        assert_eq!(session.take_edit_task().await.unwrap(), Some(42));
        assert_eq!(session.take_edit_task().await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_clears_token_and_profile() {
        let session = Session::in_memory();
        session.set_token("abc").await.unwrap();
        session
            .set_profile(&UserProfile {
                username: "ada".to_string(),
            })
            .await
            .unwrap();

        session.logout().await.unwrap();
        assert_eq!(session.token().await.unwrap(), None);
        assert_eq!(session.profile().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let path = temp_path("reopen");
        {
            let store = FileStore::open(&path).await;
            store.set(TOKEN_KEY, "persisted").await.unwrap();
        }

        let store = FileStore::open(&path).await;
        assert_eq!(
            store.get(TOKEN_KEY).await.unwrap().as_deref(),
            Some("persisted")
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn file_store_discards_corrupt_file() {
        let path = temp_path("corrupt");
        std::fs::write(&path, b"not json").unwrap();

        let store = FileStore::open(&path).await;
        assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn unreadable_file_makes_store_unavailable() {
        let dir = std::env::temp_dir();
        let store = FileStore::open(&dir).await;

        assert!(matches!(
            store.get(TOKEN_KEY).await,
            Err(ClientError::StorageUnavailable(_))
        ));
        assert!(matches!(
            store.set(TOKEN_KEY, "abc").await,
            Err(ClientError::StorageUnavailable(_))
        ));
        assert!(matches!(
            store.remove(TOKEN_KEY).await,
            Err(ClientError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let mut path = temp_path("missing_dir");
        path.push("client.json");
        let store = FileStore::open(&path).await;

        assert!(matches!(
            store.set(TOKEN_KEY, "abc").await,
            Err(ClientError::StorageUnavailable(_))
        ));
        assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
    }
}
