//! Shared helpers for tests and downstream backend conformance suites.
//!
//! Available to integration tests and other crates behind the `testutil`
//! feature.

use std::sync::Arc;

use crate::credentials::PlaintextCredentials;
use crate::error::BrowseResult;
use crate::facade::{BrowserConfig, KeyBrowser};
use crate::memory::MemoryStore;
use crate::registry::{ConnectionRegistry, Connector, ResolvedSpec};
use crate::store::KeyValueStore;

/// Connector that hands out the same in-memory store for every spec.
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
}

impl MemoryConnector {
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Connector for MemoryConnector {
    async fn open(&self, _spec: &ResolvedSpec) -> BrowseResult<Arc<dyn KeyValueStore>> {
        Ok(Arc::clone(&self.store) as Arc<dyn KeyValueStore>)
    }
}

/// A browser with default config wired to `store`, credentials passed
/// through as plaintext.
#[must_use]
pub fn memory_browser(store: Arc<MemoryStore>) -> KeyBrowser {
    let registry = ConnectionRegistry::new(
        Arc::new(MemoryConnector::new(store)),
        Arc::new(PlaintextCredentials),
    );
    KeyBrowser::new(Arc::new(registry), BrowserConfig::default())
}

/// A store seeded with one key of every value shape plus a few
/// namespaced strings.
#[must_use]
pub fn populated_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.set_string("greeting", "hello");
    store.set_string("user:1:name", "amy");
    store.set_string("user:2:name", "ben");
    store.set_list("queue:jobs", ["job-a", "job-b", "job-c"]);
    store.set_hash("user:1:profile", [("email", "amy@example.com"), ("plan", "pro")]);
    store.set_set("tags:active", ["alpha", "beta"]);
    store.set_zset("leaderboard", [("amy", 120.0), ("ben", 85.0)]);
    Arc::new(store)
}
