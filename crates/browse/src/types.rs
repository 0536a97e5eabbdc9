//! Common types used across browsing operations.
//!
//! This module defines the value-shape taxonomy, the cursor-based
//! pagination envelope, and the typed reply returned by raw command
//! execution.

use serde::{Deserialize, Serialize};

/// The five structural shapes a stored value can have.
///
/// This is a closed enum: dispatch in the value reader and the size
/// inspector is exhaustive over these variants. A type name the engine does
/// not recognize (e.g. a stream) is represented as `None` at the call sites
/// and handled by the store's approximate-size fallback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Scalar string value.
    String,
    /// Ordered sequence of elements.
    List,
    /// Field-to-value map.
    Hash,
    /// Unordered set of members.
    Set,
    /// Score-ordered set of members.
    SortedSet,
}

impl ValueKind {
    /// Parses a store-reported type name into a kind.
    ///
    /// Returns `None` for `"none"` (missing key) and for any type name
    /// outside the five supported shapes.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "list" => Some(Self::List),
            "hash" => Some(Self::Hash),
            "set" => Some(Self::Set),
            "zset" => Some(Self::SortedSet),
            _ => None,
        }
    }

    /// Returns the store-protocol type name for this kind.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::List => "list",
            Self::Hash => "hash",
            Self::Set => "set",
            Self::SortedSet => "zset",
        }
    }
}

/// Per-key summary produced during key enumeration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeyInfo {
    /// The key name.
    pub name: String,
    /// The value shape, or `None` if the store reported an unrecognized
    /// type name.
    pub kind: Option<ValueKind>,
    /// Shape-dependent size: string length, element count, field count, or
    /// cardinality. Falls back to the store's memory estimate (or 0) for
    /// unrecognized shapes.
    pub size: u64,
}

/// Cursor-based pagination parameters threaded between calls.
///
/// The cursor is opaque to callers: 0 starts an iteration, and a returned
/// cursor of 0 signals that iteration is complete. This is distinct from
/// offset-based paging — the underlying store only supports cursors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pagination {
    /// Resume position; 0 means "start".
    #[serde(default)]
    pub cursor: u64,
    /// Requested batch size per round-trip.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page_size() -> u64 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self { cursor: 0, page_size: default_page_size() }
    }
}

impl Pagination {
    /// Creates pagination parameters from a cursor and page size.
    #[must_use]
    pub fn new(cursor: u64, page_size: u64) -> Self {
        Self { cursor, page_size }
    }
}

/// Uniform paginated result envelope.
///
/// Returned by both key enumeration and single-key value retrieval,
/// regardless of value shape. `total` reflects the shape's true cardinality
/// wherever the store can report it cheaply; `cursor` is the resume point
/// for the next call (0 = iteration complete).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    /// The page payload.
    pub content: T,
    /// True cardinality where cheaply known, otherwise the page length.
    pub total: u64,
    /// Cursor to resume from; 0 signals completion.
    pub cursor: u64,
    /// The page size this page was produced with.
    pub page_size: u64,
}

impl<T> Page<T> {
    /// Creates a page.
    #[must_use]
    pub fn new(content: T, total: u64, cursor: u64, page_size: u64) -> Self {
        Self { content, total, cursor, page_size }
    }
}

/// Shape-dependent content of a single-key read.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "shape", content = "value", rename_all = "lowercase")]
pub enum ValueContent {
    /// The key does not exist (or has an unrecognized shape).
    Missing,
    /// Whole scalar value; always a single page.
    Scalar(String),
    /// One slice of list elements.
    Elements(Vec<String>),
    /// One scan page of hash field/value pairs.
    Fields(Vec<(String, String)>),
    /// One scan page of set members.
    Members(Vec<String>),
    /// One scan page of sorted-set member/score pairs.
    Scored(Vec<(String, f64)>),
}

impl ValueContent {
    /// Returns `true` if the content carries no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Scalar(s) => s.is_empty(),
            Self::Elements(v) | Self::Members(v) => v.is_empty(),
            Self::Fields(v) => v.is_empty(),
            Self::Scored(v) => v.is_empty(),
        }
    }
}

/// Typed reply from raw command execution.
///
/// A minimal, closed mirror of the store's wire replies, rich enough for an
/// admin surface to render. Error replies surface as
/// [`BrowseError`](crate::BrowseError), not as a variant here.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// Null reply.
    Nil,
    /// Integer reply.
    Integer(i64),
    /// Simple-string or bulk-string reply.
    Text(String),
    /// Array reply; elements may themselves be any reply shape.
    Array(Vec<Reply>),
}

/// Result of a namespace walk.
///
/// `complete` is `false` when the walk stopped early — either the configured
/// scan limit was reached or the caller cancelled — in which case
/// `namespaces` is a best-effort partial listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamespaceListing {
    /// Deduplicated, lexicographically sorted namespace prefixes.
    pub namespaces: Vec<String>,
    /// Whether the full key space was examined.
    pub complete: bool,
}
