//! Redis backend for the keylens browsing engine.
//!
//! Implements the [`KeyValueStore`](keylens_browse::KeyValueStore) trait
//! over the `redis` crate's async [`ConnectionManager`](redis::aio::ConnectionManager)
//! and provides the [`RedisConnector`] that a
//! [`ConnectionRegistry`](keylens_browse::ConnectionRegistry) uses to open
//! live connections:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use keylens_browse::credentials::AesCredentialCipher;
//! use keylens_browse::{BrowserConfig, ConnectionRegistry, ConnectionSpec, KeyBrowser};
//! use keylens_redis::RedisConnector;
//!
//! # async fn example(key: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ConnectionRegistry::new(
//!     Arc::new(RedisConnector::new()),
//!     Arc::new(AesCredentialCipher::new(key)?),
//! );
//! let browser = KeyBrowser::new(Arc::new(registry), BrowserConfig::default());
//! let size = browser.db_size(&ConnectionSpec::new("cache-01.internal")).await?;
//! # let _ = size;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod connector;
pub mod error;
pub mod store;

pub use connector::RedisConnector;
pub use error::map_redis_error;
pub use store::RedisStore;
