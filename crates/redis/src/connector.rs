//! Connector opening managed Redis connections for the registry.

use std::sync::Arc;

use async_trait::async_trait;
use keylens_browse::{BrowseResult, Connector, KeyValueStore, ResolvedSpec};
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use crate::error::map_redis_error;
use crate::store::RedisStore;

/// Opens a [`RedisStore`] per resolved connection spec.
///
/// Stateless; the registry caches the stores it hands back, so each
/// distinct spec costs one TCP connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

impl RedisConnector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for RedisConnector {
    async fn open(&self, spec: &ResolvedSpec) -> BrowseResult<Arc<dyn KeyValueStore>> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(spec.host.clone(), spec.port),
            redis: RedisConnectionInfo {
                db: spec.db,
                username: spec.username.clone(),
                password: spec.password.as_ref().map(|secret| secret.as_str().to_owned()),
                ..RedisConnectionInfo::default()
            },
        };
        tracing::debug!(host = %spec.host, port = spec.port, db = spec.db, "connecting");
        let client = redis::Client::open(info).map_err(map_redis_error)?;
        // The manager performs the handshake (including AUTH/SELECT) and
        // reconnects on its own after transport failures.
        let manager = client.get_connection_manager().await.map_err(map_redis_error)?;
        Ok(Arc::new(RedisStore::new(manager)))
    }
}
