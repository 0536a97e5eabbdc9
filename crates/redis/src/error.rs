//! Mapping from `redis` client errors onto the browsing error taxonomy.

use keylens_browse::BrowseError;
use redis::{ErrorKind, RedisError};

/// Converts a client error to a browsing error.
///
/// Preserves the semantic class where one exists: transport failures
/// become `Connection` (transient), rejected credentials become
/// `Credential`, and server complaints about the request shape become
/// `MalformedPattern` / `MalformedCommand`. Everything else is
/// `Internal` with the client error as source.
pub fn map_redis_error(err: RedisError) -> BrowseError {
    if err.is_timeout() {
        return BrowseError::timeout();
    }
    if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        return BrowseError::connection_with_source("store connection failed", err);
    }
    match err.kind() {
        ErrorKind::AuthenticationFailed => {
            BrowseError::credential(err.detail().unwrap_or("authentication failed").to_owned())
        }
        ErrorKind::ResponseError => {
            let detail = err.detail().unwrap_or_default().to_owned();
            if detail.contains("pattern") {
                BrowseError::malformed_pattern(detail)
            } else if detail.contains("syntax error")
                || detail.contains("unknown command")
                || detail.contains("wrong number of arguments")
            {
                BrowseError::malformed_command(detail)
            } else {
                BrowseError::internal_with_source("store rejected the request", err)
            }
        }
        ErrorKind::BusyLoadingError | ErrorKind::TryAgain | ErrorKind::MasterDown => {
            BrowseError::connection_with_source("store is temporarily unavailable", err)
        }
        _ => BrowseError::internal_with_source("store client error", err),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn response_error(detail: &str) -> RedisError {
        RedisError::from((ErrorKind::ResponseError, "response", detail.to_owned()))
    }

    #[test]
    fn io_errors_become_transient_connection_errors() {
        let err = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        let mapped = map_redis_error(err);
        assert!(matches!(mapped, BrowseError::Connection { .. }));
        assert!(mapped.is_transient());
    }

    #[test]
    fn auth_failures_become_credential_errors() {
        let err = RedisError::from((ErrorKind::AuthenticationFailed, "auth", "WRONGPASS".to_owned()));
        assert!(matches!(map_redis_error(err), BrowseError::Credential { .. }));
    }

    #[test]
    fn pattern_complaints_become_malformed_pattern() {
        let mapped = map_redis_error(response_error("invalid pattern supplied to MATCH"));
        assert!(matches!(mapped, BrowseError::MalformedPattern { .. }));
    }

    #[test]
    fn syntax_complaints_become_malformed_command() {
        let mapped = map_redis_error(response_error("syntax error"));
        assert!(matches!(mapped, BrowseError::MalformedCommand { .. }));
        let mapped = map_redis_error(response_error("unknown command 'NOPE'"));
        assert!(matches!(mapped, BrowseError::MalformedCommand { .. }));
    }

    #[test]
    fn other_response_errors_keep_their_source() {
        let mapped = map_redis_error(response_error("OOM command not allowed"));
        let BrowseError::Internal { source, .. } = mapped else {
            panic!("expected internal error");
        };
        assert!(source.is_some());
    }
}
