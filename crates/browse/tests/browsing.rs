//! End-to-end browsing over an in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use keylens_browse::testutil::{memory_browser, populated_store};
use keylens_browse::{
    BrowseError, ConnectionSpec, MemoryStore, Page, Pagination, Reply, ValueContent,
    ValueKind,
};

fn spec() -> ConnectionSpec {
    ConnectionSpec::new("localhost")
}

#[tokio::test]
async fn db_size_counts_every_key() {
    let browser = memory_browser(populated_store());
    assert_eq!(browser.db_size(&spec()).await.unwrap(), 7);
}

#[tokio::test]
async fn namespaces_summarize_the_key_space() {
    let browser = memory_browser(populated_store());
    let listing = browser.namespaces(&spec()).await.unwrap();
    assert_eq!(listing.namespaces, vec!["queue:", "tags:", "user:1:", "user:2:"]);
    assert!(listing.complete);
}

#[tokio::test]
async fn scan_keys_enriches_with_kind_and_size() {
    let browser = memory_browser(populated_store());
    let page = browser
        .scan_keys(&spec(), Some("user:1:*"), Pagination { cursor: 0, page_size: 100 })
        .await
        .unwrap();
    let mut keys = page.content;
    keys.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].name, "user:1:name");
    assert_eq!(keys[0].kind, Some(ValueKind::String));
    assert_eq!(keys[0].size, 3); // "amy"
    assert_eq!(keys[1].name, "user:1:profile");
    assert_eq!(keys[1].kind, Some(ValueKind::Hash));
    assert_eq!(keys[1].size, 2);
}

#[tokio::test]
async fn scan_keys_pages_through_sparse_matches() {
    let store = Arc::new(MemoryStore::new());
    for i in 0..40 {
        store.set_string(format!("filler:{i:02}"), "v");
    }
    store.set_string("zz:needle", "v");
    let browser = memory_browser(store);
    // The match sits past several empty windows; the adaptive scanner
    // must reach it in one call.
    let page = browser
        .scan_keys(&spec(), Some("zz:*"), Pagination { cursor: 0, page_size: 5 })
        .await
        .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].name, "zz:needle");
}

#[tokio::test]
async fn get_key_reads_each_shape() {
    let browser = memory_browser(populated_store());
    let s = spec();
    let read = |key: &'static str| {
        let browser = browser.clone();
        let s = s.clone();
        async move {
            browser
                .get_key(&s, key, None, Pagination { cursor: 0, page_size: 100 })
                .await
                .unwrap()
        }
    };

    assert_eq!(read("greeting").await.content, ValueContent::Scalar("hello".into()));
    assert_eq!(
        read("queue:jobs").await.content,
        ValueContent::Elements(vec!["job-a".into(), "job-b".into(), "job-c".into()])
    );
    assert_eq!(
        read("tags:active").await.content,
        ValueContent::Members(vec!["alpha".into(), "beta".into()])
    );
    let Page { content: ValueContent::Scored(scored), .. } = read("leaderboard").await else {
        panic!("expected scored members");
    };
    assert_eq!(scored, vec![("ben".into(), 85.0), ("amy".into(), 120.0)]);
}

#[tokio::test]
async fn get_key_on_missing_key_is_empty_not_an_error() {
    let browser = memory_browser(populated_store());
    let page =
        browser.get_key(&spec(), "missing", None, Pagination::default()).await.unwrap();
    assert_eq!(page.content, ValueContent::Missing);
    assert_eq!(page.total, 0);
    assert_eq!(page.cursor, 0);
}

#[tokio::test]
async fn delete_reports_only_keys_that_existed() {
    let browser = memory_browser(populated_store());
    let removed = browser
        .delete(&spec(), &["greeting".into(), "missing".into(), "queue:jobs".into()])
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(browser.db_size(&spec()).await.unwrap(), 5);
    assert_eq!(browser.delete(&spec(), &[]).await.unwrap(), 0);
}

#[tokio::test]
async fn execute_tokenizes_quoted_arguments() {
    let browser = memory_browser(Arc::new(MemoryStore::new()));
    let s = spec();
    let reply = browser.execute(&s, "SET greeting \"hello there\"").await.unwrap();
    assert_eq!(reply, Reply::Text("OK".into()));
    let reply = browser.execute(&s, "GET greeting").await.unwrap();
    assert_eq!(reply, Reply::Text("hello there".into()));
}

#[tokio::test]
async fn execute_rejects_an_empty_line() {
    let browser = memory_browser(Arc::new(MemoryStore::new()));
    let err = browser.execute(&spec(), "   ").await.unwrap_err();
    assert!(matches!(err, BrowseError::MalformedCommand { .. }));
}

#[tokio::test]
async fn batch_execute_returns_ordered_replies() {
    let browser = memory_browser(Arc::new(MemoryStore::new()));
    let replies = browser
        .batch_execute(
            &spec(),
            &[
                "SET k 'first value'".into(),
                "".into(),
                "GET k".into(),
                "RPUSH l a b c".into(),
                "LLEN l".into(),
            ],
        )
        .await
        .unwrap();
    assert_eq!(
        replies,
        vec![
            Reply::Text("OK".into()),
            Reply::Text("first value".into()),
            Reply::Integer(3),
            Reply::Integer(3),
        ]
    );
}

#[tokio::test]
async fn zero_page_size_falls_back_to_the_configured_default() {
    let store = Arc::new(MemoryStore::new());
    for i in 0..30 {
        store.set_string(format!("k:{i:02}"), "v");
    }
    let browser = memory_browser(store);
    let page = browser
        .scan_keys(&spec(), None, Pagination { cursor: 0, page_size: 0 })
        .await
        .unwrap();
    assert_eq!(page.content.len(), 10);
    assert_eq!(page.page_size, 10);
}

#[tokio::test]
async fn equivalent_specs_share_one_connection() {
    // Writes through one spec are visible through a differently-cased
    // spelling of the same spec.
    let browser = memory_browser(Arc::new(MemoryStore::new()));
    let lower = ConnectionSpec::new("localhost");
    let upper = ConnectionSpec::new("LOCALHOST");
    browser.execute(&lower, "SET shared yes").await.unwrap();
    assert_eq!(browser.execute(&upper, "GET shared").await.unwrap(), Reply::Text("yes".into()));
}
