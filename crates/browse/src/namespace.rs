//! Namespace summarization over colon-delimited key names.
//!
//! Keys like `user:42:profile` conventionally encode a hierarchy; the
//! summarizer walks the whole key space and reports the distinct prefixes
//! up to and including the last `:`, giving a top-level table of contents
//! without transferring every key to the caller.

use std::collections::BTreeSet;

use tokio_util::sync::CancellationToken;

use crate::error::BrowseResult;
use crate::scan::adaptive_scan;
use crate::store::KeyValueStore;
use crate::types::NamespaceListing;

/// Bounds for a namespace walk.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceBounds {
    /// Batch size for each scan round.
    pub page_size: u64,
    /// Growth cap for the adaptive scanner.
    pub count_cap: u64,
    /// Stop after examining this many keys, reporting a partial result.
    pub scan_limit: u64,
}

/// Walks the key space and collects distinct `prefix:` namespaces.
///
/// A key contributes the text up to and including its *last* colon;
/// keys without a colon contribute nothing. Results are deduplicated
/// and lexicographically sorted.
///
/// The walk ends early — with `complete = false` — when it has examined
/// `scan_limit` keys or when `cancel` fires; the namespaces gathered so
/// far are still returned.
///
/// # Errors
///
/// Propagates store scan failures.
pub async fn summarize_namespaces(
    store: &dyn KeyValueStore,
    bounds: NamespaceBounds,
    cancel: &CancellationToken,
) -> BrowseResult<NamespaceListing> {
    let mut namespaces = BTreeSet::new();
    let mut cursor = 0u64;
    let mut examined = 0u64;
    let complete = loop {
        if cancel.is_cancelled() {
            tracing::debug!(examined, "namespace walk cancelled");
            break false;
        }
        if examined >= bounds.scan_limit {
            tracing::debug!(examined, limit = bounds.scan_limit, "namespace walk hit scan limit");
            break false;
        }
        let (next, keys) = adaptive_scan(cursor, bounds.page_size, bounds.count_cap, |c, n| {
            store.scan_keys(c, n, None)
        })
        .await?;
        examined += keys.len() as u64;
        for key in &keys {
            if let Some(pos) = key.rfind(':') {
                namespaces.insert(key[..=pos].to_owned());
            }
        }
        if next == 0 {
            break true;
        }
        cursor = next;
    };
    Ok(NamespaceListing { namespaces: namespaces.into_iter().collect(), complete })
}
