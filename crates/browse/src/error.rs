//! Browsing error types and result alias.
//!
//! Every operation in this crate returns [`BrowseResult<T>`]. The variants
//! form the canonical taxonomy for the engine: credential decryption
//! failures, store connectivity failures, malformed match patterns or raw
//! command lines, and backend-internal errors. A key that does not exist is
//! **not** an error anywhere in this crate — absence is reported as an empty
//! page with a zero total.

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for browsing operations.
pub type BrowseResult<T> = Result<T, BrowseError>;

/// Errors that can occur while browsing a key space.
///
/// Errors preserve their source chain via the `#[source]` attribute so
/// debugging tools can display the full context.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BrowseError {
    /// A credential field could not be decrypted.
    ///
    /// Malformed or truncated ciphertext, or a ciphertext produced under a
    /// different process key. Never retried; the offending spec is not
    /// cached, so a corrected spec on the next call can succeed.
    #[error("Credential error: {message}")]
    Credential {
        /// Description of the decryption failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The store is unreachable or refused the connection.
    ///
    /// Not retried by this engine; an outer retry policy may choose to.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
        /// The underlying error that caused this connection failure.
        #[source]
        source: Option<BoxError>,
    },

    /// A match pattern was rejected by the store.
    ///
    /// Surfaced as-is; the engine performs no pattern validation of its own.
    #[error("Malformed pattern: {pattern}")]
    MalformedPattern {
        /// The rejected pattern.
        pattern: String,
    },

    /// A raw command line could not be tokenized under the strict quote
    /// policy (unbalanced quoting).
    #[error("Malformed command: {message}")]
    MalformedCommand {
        /// Description of the tokenizer failure.
        message: String,
    },

    /// The store reported an operation as unsupported.
    #[error("Unsupported operation: {message}")]
    Unsupported {
        /// Description of the unsupported operation.
        message: String,
    },

    /// Internal backend error.
    ///
    /// Catch-all for store-side errors that do not fit other categories.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },

    /// Operation exceeded its time limit.
    #[error("Operation timeout")]
    Timeout,
}

impl BrowseError {
    /// Creates a new `Credential` error with the given message.
    #[must_use]
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential { message: message.into(), source: None }
    }

    /// Creates a new `Credential` error with a message and source error.
    #[must_use]
    pub fn credential_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Credential { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a new `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `MalformedPattern` error for the given pattern.
    #[must_use]
    pub fn malformed_pattern(pattern: impl Into<String>) -> Self {
        Self::MalformedPattern { pattern: pattern.into() }
    }

    /// Creates a new `MalformedCommand` error with the given message.
    #[must_use]
    pub fn malformed_command(message: impl Into<String>) -> Self {
        Self::MalformedCommand { message: message.into() }
    }

    /// Creates a new `Unsupported` error with the given message.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported { message: message.into() }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a new `Internal` error with a message and source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Returns `true` if the error is transient (connection/timeout) and an
    /// outer retry policy might reasonably retry the whole call.
    ///
    /// Credential, pattern, and command errors are definitive and must not
    /// be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout)
    }
}
