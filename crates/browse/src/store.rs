//! Store protocol trait definition.
//!
//! This module defines [`KeyValueStore`], the abstraction over the external
//! Redis-like store this engine browses. The engine is a read/administrative
//! lens: it does not own the store and assumes nothing about durability or
//! value schemas.
//!
//! # Design Philosophy
//!
//! - **Keys and values are decoded strings**: the protocol is used with response decoding enabled;
//!   binary-unsafe values are replaced, not errored on.
//! - **Async by default**: every method is a network round-trip.
//! - **Cursor scans, not offsets**: the store cannot page by offset; all enumeration is
//!   cursor-based with a terminal cursor of 0.
//!
//! Implementations map their internal errors to
//! [`BrowseError`](crate::BrowseError); a missing key is never an error at
//! this layer.
//!
//! See [`MemoryStore`](crate::MemoryStore) for a reference implementation.

use async_trait::async_trait;

use crate::{error::BrowseResult, types::Reply};

/// Abstract protocol for the Redis-like store under inspection.
///
/// Implementations must be thread-safe (`Send + Sync`) and tolerate
/// concurrent calls: each browsing request may hold its own connection.
///
/// # Key Operations
///
/// | Method | Description |
/// |--------|-------------|
/// | [`db_size`](KeyValueStore::db_size) | Total number of keys |
/// | [`scan_keys`](KeyValueStore::scan_keys) | One cursor page of key names |
/// | [`key_type`](KeyValueStore::key_type) | Store-reported type name, if the key exists |
/// | [`get_string`](KeyValueStore::get_string) | Scalar value |
/// | [`list_range`](KeyValueStore::list_range) | Inclusive element range of a list |
/// | [`hash_scan`](KeyValueStore::hash_scan) | One cursor page of hash fields |
/// | [`set_scan`](KeyValueStore::set_scan) | One cursor page of set members |
/// | [`zset_scan`](KeyValueStore::zset_scan) | One cursor page of member/score pairs |
/// | [`delete`](KeyValueStore::delete) | Remove keys, returning the removed count |
/// | [`execute`](KeyValueStore::execute) | Raw command execution |
/// | [`pipeline`](KeyValueStore::pipeline) | Pipelined batch execution |
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the total number of keys in the selected database.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn db_size(&self) -> BrowseResult<u64>;

    /// Fetches one cursor page of key names.
    ///
    /// `count` is a hint for the number of positions examined per call, not
    /// a guarantee on the number of returned keys: a page may be empty while
    /// the returned cursor is non-zero (a sparse region). A returned cursor
    /// of 0 signals the iteration is complete.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn scan_keys(
        &self,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<String>)>;

    /// Returns the store-reported type name of a key, or `None` if the key
    /// does not exist.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn key_type(&self, key: &str) -> BrowseResult<Option<String>>;

    /// Returns the scalar value of a string key, or `None` if absent.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn get_string(&self, key: &str) -> BrowseResult<Option<String>>;

    /// Returns the byte length of a string value (0 if absent).
    #[must_use = "store operations may fail and errors must be handled"]
    async fn string_len(&self, key: &str) -> BrowseResult<u64>;

    /// Returns the element count of a list (0 if absent).
    #[must_use = "store operations may fail and errors must be handled"]
    async fn list_len(&self, key: &str) -> BrowseResult<u64>;

    /// Returns the elements of a list between `start` and `stop`, both
    /// inclusive. Negative indices count from the end (`-1` is the last
    /// element). Out-of-range bounds are clamped, not errored on.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn list_range(&self, key: &str, start: i64, stop: i64) -> BrowseResult<Vec<String>>;

    /// Returns the field count of a hash (0 if absent).
    #[must_use = "store operations may fail and errors must be handled"]
    async fn hash_len(&self, key: &str) -> BrowseResult<u64>;

    /// Fetches one cursor page of hash field/value pairs.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn hash_scan(
        &self,
        key: &str,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<(String, String)>)>;

    /// Returns the cardinality of a set (0 if absent).
    #[must_use = "store operations may fail and errors must be handled"]
    async fn set_card(&self, key: &str) -> BrowseResult<u64>;

    /// Fetches one cursor page of set members.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn set_scan(
        &self,
        key: &str,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<String>)>;

    /// Returns the cardinality of a sorted set (0 if absent).
    #[must_use = "store operations may fail and errors must be handled"]
    async fn zset_card(&self, key: &str) -> BrowseResult<u64>;

    /// Fetches one cursor page of sorted-set member/score pairs.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn zset_scan(
        &self,
        key: &str,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<(String, f64)>)>;

    /// Returns the store's approximate memory usage for a key in bytes, or
    /// `None` if the store cannot estimate it. Used as the size fallback for
    /// unrecognized value shapes.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn memory_usage(&self, key: &str) -> BrowseResult<Option<u64>>;

    /// Deletes the given keys, returning how many existed and were removed.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn delete(&self, keys: &[String]) -> BrowseResult<u64>;

    /// Executes a single raw command (already tokenized into arguments).
    ///
    /// The command's reply is returned as-is in typed form; an error reply
    /// from the store surfaces as a [`BrowseError`](crate::BrowseError).
    #[must_use = "store operations may fail and errors must be handled"]
    async fn execute(&self, args: &[String]) -> BrowseResult<Reply>;

    /// Submits multiple commands as one pipelined unit.
    ///
    /// Returns the ordered per-command replies. Whether one failing command
    /// aborts the others follows the store's own pipeline contract; this
    /// engine does not override it.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn pipeline(&self, commands: &[Vec<String>]) -> BrowseResult<Vec<Reply>>;
}
