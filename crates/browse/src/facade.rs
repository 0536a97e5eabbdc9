//! High-level browsing operations over registered connections.

use std::sync::Arc;

use bon::Builder;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::BrowseResult;
use crate::namespace::{self, NamespaceBounds};
use crate::reader;
use crate::registry::{ConnectionRegistry, ConnectionSpec};
use crate::scan::{adaptive_scan, DEFAULT_COUNT_CAP};
use crate::tokenize::{tokenize, QuotePolicy};
use crate::types::{KeyInfo, NamespaceListing, Page, Pagination, Reply, ValueContent, ValueKind};

/// Tunables for browsing behavior.
///
/// All fields have sensible defaults; construct with `builder()` or
/// deserialize from configuration.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Page size used when a caller does not specify one.
    #[builder(default = default_page_size())]
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound on adaptive scan batch growth.
    #[builder(default = DEFAULT_COUNT_CAP)]
    #[serde(default = "default_scan_count_cap")]
    pub scan_count_cap: u64,
    /// Batch size for namespace walks.
    #[builder(default = default_namespace_page_size())]
    #[serde(default = "default_namespace_page_size")]
    pub namespace_page_size: u64,
    /// Keys a namespace walk may examine before returning partial results.
    #[builder(default = default_namespace_scan_limit())]
    #[serde(default = "default_namespace_scan_limit")]
    pub namespace_scan_limit: u64,
    /// How raw commands treat unbalanced quotes.
    #[builder(default)]
    #[serde(default)]
    pub quote_policy: QuotePolicy,
}

fn default_page_size() -> u64 {
    10
}

fn default_scan_count_cap() -> u64 {
    DEFAULT_COUNT_CAP
}

fn default_namespace_page_size() -> u64 {
    200
}

fn default_namespace_scan_limit() -> u64 {
    10_000
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Entry point for browsing key spaces across registered connections.
///
/// Cheap to clone; every operation resolves its connection through the
/// shared registry, so repeated calls against the same spec reuse one
/// live handle.
#[derive(Debug, Clone)]
pub struct KeyBrowser {
    registry: Arc<ConnectionRegistry>,
    config: BrowserConfig,
}

impl KeyBrowser {
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, config: BrowserConfig) -> Self {
        Self { registry, config }
    }

    #[must_use]
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Number of keys in the spec's database.
    #[tracing::instrument(skip_all, fields(host = %spec.host, db = spec.db))]
    pub async fn db_size(&self, spec: &ConnectionSpec) -> BrowseResult<u64> {
        self.registry.store(spec).await?.db_size().await
    }

    /// A zero page size means "use the configured default".
    fn normalize(&self, pagination: Pagination) -> Pagination {
        if pagination.page_size == 0 {
            Pagination { page_size: self.config.default_page_size, ..pagination }
        } else {
            pagination
        }
    }

    /// Distinct `prefix:` namespaces in the key space.
    pub async fn namespaces(&self, spec: &ConnectionSpec) -> BrowseResult<NamespaceListing> {
        self.namespaces_with_cancel(spec, &CancellationToken::new()).await
    }

    /// Like [`namespaces`](Self::namespaces), stopping early with a
    /// partial listing when `cancel` fires.
    #[tracing::instrument(skip_all, fields(host = %spec.host, db = spec.db))]
    pub async fn namespaces_with_cancel(
        &self,
        spec: &ConnectionSpec,
        cancel: &CancellationToken,
    ) -> BrowseResult<NamespaceListing> {
        let store = self.registry.store(spec).await?;
        let bounds = NamespaceBounds {
            page_size: self.config.namespace_page_size,
            count_cap: self.config.scan_count_cap,
            scan_limit: self.config.namespace_scan_limit,
        };
        namespace::summarize_namespaces(store.as_ref(), bounds, cancel).await
    }

    /// One page of keys matching `pattern`, each enriched with its kind
    /// and size. `total` reflects this page, not the whole key space —
    /// matched totals cannot be reported without a full walk.
    #[tracing::instrument(skip_all, fields(host = %spec.host, db = spec.db, pattern))]
    pub async fn scan_keys(
        &self,
        spec: &ConnectionSpec,
        pattern: Option<&str>,
        pagination: Pagination,
    ) -> BrowseResult<Page<Vec<KeyInfo>>> {
        let pagination = self.normalize(pagination);
        let store = self.registry.store(spec).await?;
        let (next, names) = adaptive_scan(
            pagination.cursor,
            pagination.page_size,
            self.config.scan_count_cap,
            |c, n| store.scan_keys(c, n, pattern),
        )
        .await?;
        let mut keys = Vec::with_capacity(names.len());
        for name in names {
            let kind = store
                .key_type(&name)
                .await?
                .and_then(|type_name| ValueKind::from_type_name(&type_name));
            let size = reader::value_size(store.as_ref(), &name, kind).await?;
            keys.push(KeyInfo { name, kind, size });
        }
        let total = keys.len() as u64;
        Ok(Page::new(keys, total, next, pagination.page_size))
    }

    /// One page of a key's value; see [`reader::read_value`] for the
    /// per-kind dispatch. A missing key is an empty page, not an error.
    #[tracing::instrument(skip_all, fields(host = %spec.host, db = spec.db, key))]
    pub async fn get_key(
        &self,
        spec: &ConnectionSpec,
        key: &str,
        pattern: Option<&str>,
        pagination: Pagination,
    ) -> BrowseResult<Page<ValueContent>> {
        let pagination = self.normalize(pagination);
        let store = self.registry.store(spec).await?;
        reader::read_value(store.as_ref(), key, pattern, pagination, self.config.scan_count_cap)
            .await
    }

    /// Deletes the named keys; returns how many existed.
    #[tracing::instrument(skip_all, fields(host = %spec.host, db = spec.db, keys = keys.len()))]
    pub async fn delete(&self, spec: &ConnectionSpec, keys: &[String]) -> BrowseResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        self.registry.store(spec).await?.delete(keys).await
    }

    /// Tokenizes and runs one raw command.
    ///
    /// # Errors
    ///
    /// [`crate::BrowseError::MalformedCommand`] when the line tokenizes
    /// to nothing, or on an unbalanced quote under a strict policy;
    /// otherwise whatever the store reports.
    #[tracing::instrument(skip_all, fields(host = %spec.host, db = spec.db))]
    pub async fn execute(&self, spec: &ConnectionSpec, raw: &str) -> BrowseResult<Reply> {
        let args = tokenize(raw, self.config.quote_policy)?;
        if args.is_empty() {
            return Err(crate::BrowseError::malformed_command("empty command"));
        }
        self.registry.store(spec).await?.execute(&args).await
    }

    /// Tokenizes each line and submits the batch as one pipelined unit,
    /// returning replies in command order. Blank lines are skipped.
    #[tracing::instrument(skip_all, fields(host = %spec.host, db = spec.db, lines = lines.len()))]
    pub async fn batch_execute(
        &self,
        spec: &ConnectionSpec,
        lines: &[String],
    ) -> BrowseResult<Vec<Reply>> {
        let mut commands = Vec::with_capacity(lines.len());
        for line in lines {
            let args = tokenize(line, self.config.quote_policy)?;
            if !args.is_empty() {
                commands.push(args);
            }
        }
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        self.registry.store(spec).await?.pipeline(&commands).await
    }
}
