//! Cache-first asset layer.
//!
//! A versioned cache is pre-populated on install, stale versions are dropped on
//! activation, and every GET is answered from cache before touching the network.
//! When the network is gone the cached shell document is served instead.

mod fetch;

pub use fetch::{EmbeddedFetcher, Fetcher, HttpFetcher};

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const CACHE_PREFIX: &str = "patient-tally";
pub const SHELL_PATH: &str = "/index.html";
pub const MANIFEST: &[&str] = &[
    "/",
    SHELL_PATH,
    "/manifest.webmanifest",
    "/icons/icon-192.svg",
    "/icons/icon-512.svg",
];

pub fn cache_name(version: &str) -> String {
    format!("{CACHE_PREFIX}-{version}")
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("network request for {path} failed: {reason}")]
    Network { path: String, reason: String },
    #[error("precaching {path} returned {status}")]
    BadStatus { path: String, status: StatusCode },
    #[error("cannot activate {cache} while {state}")]
    NotInstalled { cache: String, state: Lifecycle },
}

#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl AssetRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub status: StatusCode,
    pub content_type: String,
    /// Upstream headers other than `Content-Type`.
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl StoredResponse {
    pub fn text(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8".to_string(),
            headers: HeaderMap::new(),
            body: Bytes::from_static(message.as_bytes()),
        }
    }

    fn offline() -> Self {
        Self::text(StatusCode::SERVICE_UNAVAILABLE, "offline")
    }

    fn unreachable() -> Self {
        Self::text(StatusCode::BAD_GATEWAY, "upstream unreachable")
    }
}

impl IntoResponse for StoredResponse {
    fn into_response(self) -> Response {
        let mut headers = self.headers;
        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }
        (self.status, headers, self.body).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Installing,
    Installed,
    Activating,
    Active,
    Redundant,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Lifecycle::Installing => "installing",
            Lifecycle::Installed => "installed",
            Lifecycle::Activating => "activating",
            Lifecycle::Active => "active",
            Lifecycle::Redundant => "redundant",
        };
        f.write_str(label)
    }
}

type Entries = HashMap<String, StoredResponse>;

/// Named caches shared by every cache version.
#[derive(Default)]
pub struct CacheStorage {
    caches: RwLock<BTreeMap<String, Entries>>,
}

impl CacheStorage {
    pub async fn names(&self) -> Vec<String> {
        self.caches.read().await.keys().cloned().collect()
    }

    pub async fn commit(&self, cache: &str, entries: Entries) {
        self.caches
            .write()
            .await
            .entry(cache.to_string())
            .or_default()
            .extend(entries);
    }

    pub async fn put(&self, cache: &str, path: &str, response: StoredResponse) {
        self.caches
            .write()
            .await
            .entry(cache.to_string())
            .or_default()
            .insert(path.to_string(), response);
    }

    pub async fn delete(&self, cache: &str) -> bool {
        self.caches.write().await.remove(cache).is_some()
    }

    /// Looks in `preferred` first, then in every other cache.
    pub async fn lookup(&self, path: &str, preferred: &str) -> Option<StoredResponse> {
        let caches = self.caches.read().await;
        if let Some(hit) = caches.get(preferred).and_then(|entries| entries.get(path)) {
            return Some(hit.clone());
        }
        caches
            .iter()
            .filter(|(name, _)| name.as_str() != preferred)
            .find_map(|(_, entries)| entries.get(path).cloned())
    }
}

#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub version: String,
    pub state: Lifecycle,
    pub caches: Vec<String>,
}

/// One cache version and its install/activate lifecycle.
pub struct OfflineCache {
    version: String,
    name: String,
    storage: Arc<CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    lifecycle: RwLock<Lifecycle>,
}

impl OfflineCache {
    pub fn new(version: &str, storage: Arc<CacheStorage>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            version: version.to_string(),
            name: cache_name(version),
            storage,
            fetcher,
            lifecycle: RwLock::new(Lifecycle::Installing),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.read().await
    }

    async fn transition(&self, next: Lifecycle) {
        *self.lifecycle.write().await = next;
        debug!("cache {} is {next}", self.name);
    }

    /// Precaches the manifest. Nothing is committed unless every entry succeeds.
    pub async fn install(&self) -> Result<(), AssetError> {
        self.transition(Lifecycle::Installing).await;
        match self.precache().await {
            Ok(entries) => {
                self.storage.commit(&self.name, entries).await;
                self.transition(Lifecycle::Installed).await;
                info!("installed asset cache {}", self.name);
                Ok(())
            }
            Err(err) => {
                self.transition(Lifecycle::Redundant).await;
                warn!("asset cache {} failed to install: {err}", self.name);
                Err(err)
            }
        }
    }

    async fn precache(&self) -> Result<Entries, AssetError> {
        let mut entries = Entries::new();
        for path in MANIFEST {
            let response = self.fetcher.fetch(&AssetRequest::get(*path)).await?;
            if !response.status.is_success() {
                return Err(AssetError::BadStatus {
                    path: path.to_string(),
                    status: response.status,
                });
            }
            entries.insert(path.to_string(), response);
        }
        Ok(entries)
    }

    /// Drops every cache but this version's. Returns the deleted names.
    pub async fn activate(&self) -> Result<Vec<String>, AssetError> {
        match self.lifecycle().await {
            Lifecycle::Installed => {}
            Lifecycle::Active => return Ok(Vec::new()),
            state => {
                return Err(AssetError::NotInstalled {
                    cache: self.name.clone(),
                    state,
                });
            }
        }

        self.transition(Lifecycle::Activating).await;
        let mut deleted = Vec::new();
        for name in self.storage.names().await {
            if name != self.name && self.storage.delete(&name).await {
                info!("deleted stale asset cache {name}");
                deleted.push(name);
            }
        }
        self.transition(Lifecycle::Active).await;
        Ok(deleted)
    }

    pub async fn handle(&self, request: AssetRequest) -> StoredResponse {
        if request.method != Method::GET {
            return match self.fetcher.fetch(&request).await {
                Ok(response) => response,
                Err(err) => {
                    warn!("{err}");
                    StoredResponse::unreachable()
                }
            };
        }

        if let Some(hit) = self.storage.lookup(&request.path, &self.name).await {
            debug!("cache hit for {}", request.path);
            return hit;
        }

        match self.fetcher.fetch(&request).await {
            Ok(response) => {
                if response.status.is_success() {
                    self.storage
                        .put(&self.name, &request.path, response.clone())
                        .await;
                }
                response
            }
            Err(err) => {
                warn!("serving offline shell: {err}");
                self.storage
                    .lookup(SHELL_PATH, &self.name)
                    .await
                    .unwrap_or_else(StoredResponse::offline)
            }
        }
    }

    pub async fn status(&self) -> CacheStatus {
        CacheStatus {
            version: self.version.clone(),
            state: self.lifecycle().await,
            caches: self.storage.names().await,
        }
    }
}
