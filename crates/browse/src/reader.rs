//! Uniform value reading across the five value shapes.
//!
//! A key's contents come back as one [`Page<ValueContent>`] regardless of
//! kind, so callers render strings, lists, hashes, sets and sorted sets
//! through one code path. A missing key is an empty page with `total = 0`,
//! never an error.

use crate::error::BrowseResult;
use crate::scan::adaptive_scan;
use crate::store::KeyValueStore;
use crate::types::{Page, Pagination, ValueContent, ValueKind};

/// Reads one page of a key's value.
///
/// Dispatch by the store's reported type:
/// - string: the whole scalar as a single-element page, `total = 1`;
/// - list: one range read from the offset cursor to the end (a list
///   has no scan cursor, so the returned page cursor is always 0 and a
///   non-zero request cursor is an offset into the list);
/// - hash, set, sorted set: one adaptive scan round, `total` taken from
///   the kind's O(1) cardinality;
/// - missing or unrecognized type: empty page, `total = 0`.
///
/// `pattern` filters hash fields and set/sorted-set members; it is
/// ignored for strings and lists.
///
/// # Errors
///
/// Propagates store failures; a missing key is not a failure.
pub async fn read_value(
    store: &dyn KeyValueStore,
    key: &str,
    pattern: Option<&str>,
    pagination: Pagination,
    scan_count_cap: u64,
) -> BrowseResult<Page<ValueContent>> {
    let Pagination { cursor, page_size } = pagination;
    let kind = match store.key_type(key).await? {
        Some(name) => ValueKind::from_type_name(&name),
        None => return Ok(Page::new(ValueContent::Missing, 0, 0, page_size)),
    };
    let Some(kind) = kind else {
        return Ok(Page::new(ValueContent::Missing, 0, 0, page_size));
    };

    match kind {
        ValueKind::String => match store.get_string(key).await? {
            Some(value) => Ok(Page::new(ValueContent::Scalar(value), 1, 0, page_size)),
            None => Ok(Page::new(ValueContent::Missing, 0, 0, page_size)),
        },
        ValueKind::List => {
            let total = store.list_len(key).await?;
            let start = i64::try_from(cursor).unwrap_or(i64::MAX);
            let elements = store.list_range(key, start, -1).await?;
            Ok(Page::new(ValueContent::Elements(elements), total, 0, page_size))
        }
        ValueKind::Hash => {
            let total = store.hash_len(key).await?;
            let (next, fields) = adaptive_scan(cursor, page_size, scan_count_cap, |c, n| {
                store.hash_scan(key, c, n, pattern)
            })
            .await?;
            Ok(Page::new(ValueContent::Fields(fields), total, next, page_size))
        }
        ValueKind::Set => {
            let total = store.set_card(key).await?;
            let (next, members) = adaptive_scan(cursor, page_size, scan_count_cap, |c, n| {
                store.set_scan(key, c, n, pattern)
            })
            .await?;
            Ok(Page::new(ValueContent::Members(members), total, next, page_size))
        }
        ValueKind::SortedSet => {
            let total = store.zset_card(key).await?;
            let (next, members) = adaptive_scan(cursor, page_size, scan_count_cap, |c, n| {
                store.zset_scan(key, c, n, pattern)
            })
            .await?;
            Ok(Page::new(ValueContent::Scored(members), total, next, page_size))
        }
    }
}

/// Size of a key's value in the unit natural to its kind: characters
/// for a string, elements for everything else. An unknown kind falls
/// back to the store's memory estimate, and a missing key is 0.
///
/// # Errors
///
/// Propagates store failures.
pub async fn value_size(
    store: &dyn KeyValueStore,
    key: &str,
    kind: Option<ValueKind>,
) -> BrowseResult<u64> {
    match kind {
        Some(ValueKind::String) => store.string_len(key).await,
        Some(ValueKind::List) => store.list_len(key).await,
        Some(ValueKind::Hash) => store.hash_len(key).await,
        Some(ValueKind::Set) => store.set_card(key).await,
        Some(ValueKind::SortedSet) => store.zset_card(key).await,
        None => Ok(store.memory_usage(key).await?.unwrap_or(0)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::scan::DEFAULT_COUNT_CAP;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.set_string("s", "hello");
        store.set_list("l", ["a", "b", "c"]);
        store.set_hash("h", [("f1", "v1"), ("f2", "v2")]);
        store.set_set("set", ["m1", "m2", "m3"]);
        store.set_zset("z", [("low", 1.0), ("high", 2.0)]);
        store
    }

    async fn read(store: &MemoryStore, key: &str) -> Page<ValueContent> {
        read_value(store, key, None, Pagination::default(), DEFAULT_COUNT_CAP).await.unwrap()
    }

    #[tokio::test]
    async fn missing_key_is_an_empty_page_not_an_error() {
        let page = read(&seeded(), "nope").await;
        assert_eq!(page.content, ValueContent::Missing);
        assert_eq!(page.total, 0);
        assert_eq!(page.cursor, 0);
    }

    #[tokio::test]
    async fn string_is_a_single_element_page() {
        let page = read(&seeded(), "s").await;
        assert_eq!(page.content, ValueContent::Scalar("hello".into()));
        assert_eq!(page.total, 1);
        assert_eq!(page.cursor, 0);
    }

    #[tokio::test]
    async fn list_page_reports_full_length() {
        let page = read(&seeded(), "l").await;
        assert_eq!(
            page.content,
            ValueContent::Elements(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(page.total, 3);
        assert_eq!(page.cursor, 0);
    }

    #[tokio::test]
    async fn list_cursor_offsets_into_the_tail() {
        let store = seeded();
        let page = read_value(
            &store,
            "l",
            None,
            Pagination { cursor: 1, page_size: 2 },
            DEFAULT_COUNT_CAP,
        )
        .await
        .unwrap();
        // One range read from the offset to the end; page cursor is
        // always terminal for lists.
        assert_eq!(page.content, ValueContent::Elements(vec!["b".into(), "c".into()]));
        assert_eq!(page.total, 3);
        assert_eq!(page.cursor, 0);
    }

    #[rstest]
    #[case("h", 2)]
    #[case("set", 3)]
    #[case("z", 2)]
    #[tokio::test]
    async fn collection_totals_use_cardinality(#[case] key: &str, #[case] expected: u64) {
        let page = read(&seeded(), key).await;
        assert_eq!(page.total, expected);
    }

    #[tokio::test]
    async fn hash_fields_filter_by_pattern() {
        let store = seeded();
        let page =
            read_value(&store, "h", Some("f1"), Pagination::default(), DEFAULT_COUNT_CAP)
                .await
                .unwrap();
        assert_eq!(page.content, ValueContent::Fields(vec![("f1".into(), "v1".into())]));
        // Total is the whole hash, not the filtered count.
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn zset_page_carries_scores() {
        let page = read(&seeded(), "z").await;
        assert_eq!(
            page.content,
            ValueContent::Scored(vec![("low".into(), 1.0), ("high".into(), 2.0)])
        );
    }

    #[tokio::test]
    async fn paging_covers_every_set_member() {
        let store = MemoryStore::new();
        store.set_set("big", (0..25).map(|i| format!("m{i:02}")));
        let mut cursor = 0u64;
        let mut seen = Vec::new();
        loop {
            let page = read_value(
                &store,
                "big",
                None,
                Pagination { cursor, page_size: 4 },
                DEFAULT_COUNT_CAP,
            )
            .await
            .unwrap();
            let ValueContent::Members(members) = page.content else {
                panic!("expected set members");
            };
            seen.extend(members);
            if page.cursor == 0 {
                break;
            }
            cursor = page.cursor;
        }
        let expected: Vec<String> = (0..25).map(|i| format!("m{i:02}")).collect();
        assert_eq!(seen, expected);
    }

    #[rstest]
    #[case("s", 5)]
    #[case("l", 3)]
    #[case("h", 2)]
    #[case("set", 3)]
    #[case("z", 2)]
    #[tokio::test]
    async fn sizes_match_the_kind(#[case] key: &str, #[case] expected: u64) {
        let store = seeded();
        let kind = store
            .key_type(key)
            .await
            .unwrap()
            .and_then(|name| ValueKind::from_type_name(&name));
        assert_eq!(value_size(&store, key, kind).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn unknown_kind_falls_back_to_memory_estimate() {
        let store = seeded();
        assert!(value_size(&store, "s", None).await.unwrap() > 0);
        assert_eq!(value_size(&store, "missing", None).await.unwrap(), 0);
    }
}
