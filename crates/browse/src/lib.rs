//! Key-space browsing engine for Redis-like stores.
//!
//! This crate provides the [`KeyValueStore`] trait and the browsing logic
//! built on top of it: connection registration with decrypt-once
//! credentials, adaptive cursor scanning, uniform value reading across the
//! five value shapes, namespace summarization, and raw command execution.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Caller Layer                          │
//! │            (API handlers, consoles, admin tools)            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                       KeyBrowser                            │
//! │  db_size │ namespaces │ scan_keys │ get_key │ execute │ …   │
//! ├─────────────────────────────────────────────────────────────┤
//! │   ConnectionRegistry        │  scan / reader / namespace /  │
//! │ (fingerprint → live store,  │  tokenize                     │
//! │  decrypt-once credentials)  │  (engine logic)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    KeyValueStore trait                      │
//! │   (scan, type, per-kind reads, delete, execute, pipeline)   │
//! ├──────────────┬──────────────────────────────────────────────┤
//! │ MemoryStore  │        RedisStore (in `keylens-redis`)       │
//! │  (testing)   │               (production)                   │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use keylens_browse::credentials::PlaintextCredentials;
//! use keylens_browse::memory::MemoryStore;
//! use keylens_browse::registry::{ConnectionRegistry, ConnectionSpec, Connector, ResolvedSpec};
//! use keylens_browse::{BrowseResult, BrowserConfig, KeyBrowser, KeyValueStore, Pagination};
//!
//! struct Local(Arc<MemoryStore>);
//!
//! #[async_trait::async_trait]
//! impl Connector for Local {
//!     async fn open(&self, _spec: &ResolvedSpec) -> BrowseResult<Arc<dyn KeyValueStore>> {
//!         Ok(Arc::clone(&self.0) as Arc<dyn KeyValueStore>)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     store.set_string("user:1:name", "Alice");
//!
//!     let registry = ConnectionRegistry::new(
//!         Arc::new(Local(Arc::clone(&store))),
//!         Arc::new(PlaintextCredentials),
//!     );
//!     let browser = KeyBrowser::new(Arc::new(registry), BrowserConfig::default());
//!
//!     let spec = ConnectionSpec::new("localhost");
//!     assert_eq!(browser.db_size(&spec).await?, 1);
//!
//!     let page = browser.scan_keys(&spec, Some("user:*"), Pagination::default()).await?;
//!     assert_eq!(page.content[0].name, "user:1:name");
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`BrowseResult<T>`], which wraps the
//! [`BrowseError`] taxonomy. Backends map their internal errors onto it;
//! a key that does not exist is never an error, only an empty page.
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with a memory-backed
//!   connector and seeded stores. Enable this in `[dev-dependencies]`
//!   for integration tests.

#![deny(unsafe_code)]

pub mod credentials;
pub mod error;
pub mod facade;
pub mod memory;
pub mod namespace;
pub mod reader;
pub mod registry;
pub mod scan;
pub mod store;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;
pub mod tokenize;
pub mod types;

// Re-export primary types at crate root for convenience
pub use credentials::{AesCredentialCipher, CredentialCipher};
pub use error::{BoxError, BrowseError, BrowseResult};
pub use facade::{BrowserConfig, KeyBrowser};
pub use memory::MemoryStore;
pub use registry::{ConnectionRegistry, ConnectionSpec, Connector, Fingerprint, ResolvedSpec};
pub use scan::{adaptive_scan, DEFAULT_COUNT_CAP};
pub use store::KeyValueStore;
pub use tokenize::{tokenize, QuotePolicy};
pub use types::{
    KeyInfo, NamespaceListing, Page, Pagination, Reply, ValueContent, ValueKind,
};
pub use zeroize::Zeroizing;
