//! Connection registry: fingerprinted, decrypt-once store handles.
//!
//! Every browsing operation names its target with a [`ConnectionSpec`].
//! Opening a store connection is expensive and decrypting the spec's
//! credential doubly so, so the registry keys live handles by a content
//! fingerprint of the spec and reuses them across calls. The credential is
//! decrypted only on a cache miss; a failed decrypt or connect caches
//! nothing, so the next call retries from scratch.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::credentials::CredentialCipher;
use crate::error::BrowseResult;
use crate::store::KeyValueStore;

const DEFAULT_PORT: u16 = 6379;

/// How long an idle store handle stays registered before being dropped.
const IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// Maximum number of live store handles kept at once.
const MAX_CONNECTIONS: u64 = 64;

/// Everything needed to reach one logical database on one server.
///
/// The `password` field holds ciphertext as stored at rest; it is only
/// decrypted inside the registry when a connection is actually opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub db: i64,
    #[serde(default)]
    pub username: Option<String>,
    /// Encrypted credential, or `None` for unauthenticated servers.
    #[serde(default)]
    pub password: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ConnectionSpec {
    /// Spec for an unauthenticated server on the default port, db 0.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into(), port: DEFAULT_PORT, db: 0, username: None, password: None }
    }

    /// Content fingerprint of this spec.
    ///
    /// Host comparison is case-insensitive, so `Cache-01` and `cache-01`
    /// produce the same fingerprint. Every other field participates
    /// verbatim, including the credential ciphertext: rotating a password
    /// yields a new fingerprint and therefore a fresh connection.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let canonical = Self {
            host: self.host.to_ascii_lowercase(),
            port: self.port,
            db: self.db,
            username: self.username.clone(),
            password: self.password.clone(),
        };
        let mut hasher = Sha256::new();
        // Serializing a struct with string keys is deterministic.
        match serde_json::to_vec(&canonical) {
            Ok(bytes) => hasher.update(&bytes),
            Err(_) => hasher.update(canonical.host.as_bytes()),
        }
        Fingerprint(hex::encode(hasher.finalize()))
    }
}

/// Opaque identity of a connection spec, usable as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Twelve hex chars is plenty for log correlation.
        write!(f, "{}", &self.0[..12.min(self.0.len())])
    }
}

/// A spec with its credential decrypted, handed to a [`Connector`].
pub struct ResolvedSpec {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub username: Option<String>,
    pub password: Option<Zeroizing<String>>,
}

/// Opens a live store from a resolved connection spec.
///
/// Implementations wrap a concrete backend (a networked server, an
/// in-memory store for tests) and are free to pool internally.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// # Errors
    ///
    /// Returns [`BrowseError::Connection`] when the target is unreachable
    /// or rejects the handshake, [`BrowseError::Credential`] when it
    /// rejects authentication.
    async fn open(&self, spec: &ResolvedSpec) -> BrowseResult<Arc<dyn KeyValueStore>>;
}

/// Cache of live store handles keyed by spec fingerprint.
pub struct ConnectionRegistry {
    connector: Arc<dyn Connector>,
    cipher: Arc<dyn CredentialCipher>,
    stores: Cache<Fingerprint, Arc<dyn KeyValueStore>>,
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("live_connections", &self.stores.entry_count())
            .finish_non_exhaustive()
    }
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>, cipher: Arc<dyn CredentialCipher>) -> Self {
        Self {
            connector,
            cipher,
            stores: Cache::builder()
                .max_capacity(MAX_CONNECTIONS)
                .time_to_idle(IDLE_TTL)
                .build(),
        }
    }

    /// Returns the live store for `spec`, opening one on first use.
    ///
    /// The spec's credential is decrypted only on a miss. Nothing is
    /// cached on failure, so transient connect errors do not poison the
    /// registry.
    ///
    /// # Errors
    ///
    /// Propagates decrypt failures as [`BrowseError::Credential`] and
    /// connect failures from the [`Connector`].
    pub async fn store(&self, spec: &ConnectionSpec) -> BrowseResult<Arc<dyn KeyValueStore>> {
        let fingerprint = spec.fingerprint();
        if let Some(store) = self.stores.get(&fingerprint).await {
            return Ok(store);
        }
        tracing::debug!(%fingerprint, host = %spec.host, db = spec.db, "opening connection");
        let resolved = self.resolve(spec)?;
        let store = self.connector.open(&resolved).await?;
        self.stores.insert(fingerprint, Arc::clone(&store)).await;
        Ok(store)
    }

    /// Drops the cached handle for `spec`, if any. The next call to
    /// [`store`](Self::store) reconnects from scratch.
    pub async fn invalidate(&self, spec: &ConnectionSpec) {
        self.stores.invalidate(&spec.fingerprint()).await;
    }

    /// Drops every cached handle.
    pub fn invalidate_all(&self) {
        self.stores.invalidate_all();
    }

    fn resolve(&self, spec: &ConnectionSpec) -> BrowseResult<ResolvedSpec> {
        let password = match &spec.password {
            Some(ciphertext) => Some(self.cipher.decrypt(ciphertext)?),
            None => None,
        };
        Ok(ResolvedSpec {
            host: spec.host.clone(),
            port: spec.port,
            db: spec.db,
            username: spec.username.clone(),
            password,
        })
    }
}
