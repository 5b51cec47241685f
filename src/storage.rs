use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    io,
    path::PathBuf,
    sync::Arc,
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

pub const SESSIONS_KEY: &str = "sessions";
pub const CURRENT_KEY: &str = "current";
pub const LOCATIONS_KEY: &str = "locations";

/// Raw string storage addressed by key.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn get(&self, key: &str) -> io::Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> io::Result<()>;
}

/// One `<key>.json` file per key.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl StoreBackend for FileBackend {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn set(&self, key: &str, value: String) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> io::Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON record store. Reads fall back to a default and writes never fail the caller.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn StoreBackend>,
}

impl Store {
    pub fn new(backend: impl StoreBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    pub async fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    warn!("failed to parse stored {key}: {err}");
                    default
                }
            },
            Ok(None) => default,
            Err(err) => {
                warn!("failed to read stored {key}: {err}");
                default
            }
        }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_string_pretty(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("failed to encode {key}: {err}");
                return;
            }
        };
        match self.backend.set(key, payload).await {
            Ok(()) => debug!("saved {key}"),
            Err(err) => warn!("failed to write {key}: {err}"),
        }
    }
}
