//! Adaptive cursor scanning over sparse key spaces.
//!
//! A naive single call to a cursor-based scan primitive can return an empty
//! page with a non-terminal cursor — the examined window simply held no
//! matches. Over sparse key spaces that can repeat for many round-trips.
//! [`adaptive_scan`] keeps calling the primitive until it produces either a
//! non-empty page or a confirmed end, doubling the batch size on every empty
//! round and saturating at a cap, so the number of round-trips stays bounded
//! without exceeding the store's per-call item budget.
//!
//! This is a designed retry loop, not error recovery: store errors propagate
//! immediately.

use std::future::Future;

use crate::error::BrowseResult;

/// Default batch-size cap for adaptive growth.
pub const DEFAULT_COUNT_CAP: u64 = 200;

/// Drives a cursor-based scan primitive until it yields items or terminates.
///
/// `page` is invoked with `(cursor, count)` and must return the primitive's
/// `(next_cursor, items)` pair. The loop returns as soon as a call yields at
/// least one item or a terminal cursor (0). On an empty non-terminal page
/// the batch size doubles, saturating at `count_cap`; scanning continues
/// from the returned cursor at the capped rate — a long sparse region takes
/// more round-trips but never fails.
///
/// # Errors
///
/// Any error from the primitive is returned unchanged.
pub async fn adaptive_scan<T, F, Fut>(
    mut cursor: u64,
    count: u64,
    count_cap: u64,
    mut page: F,
) -> BrowseResult<(u64, Vec<T>)>
where
    F: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = BrowseResult<(u64, Vec<T>)>>,
{
    let mut count = count.clamp(1, count_cap.max(1));
    loop {
        let (next_cursor, items) = page(cursor, count).await?;
        if !items.is_empty() || next_cursor == 0 {
            return Ok((next_cursor, items));
        }
        tracing::debug!(cursor, next_cursor, count, "empty scan page, growing batch size");
        cursor = next_cursor;
        count = count.saturating_mul(2).min(count_cap);
    }
}
