use std::time::Duration;
use thiserror::Error;

/// Errors produced by service operations and the machinery around them.
///
/// Propagation policy: structural errors (`RefUnresolved`, `Unsupported`,
/// `AuthenticationFailed`) abort the whole command. `RateLimited` is
/// retried a bounded number of times by [`backoff`](crate::backoff).
/// `RemoteNotFound` and `RemoteTransient` are isolated when they occur on
/// a single item inside a bulk listing or transfer: the item is logged and
/// skipped, the batch continues.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No registered service claimed the reference.
    #[error("No service could interpret '{input}' (known services: {})", known.join(", "))]
    RefUnresolved { input: String, known: Vec<String> },

    /// The service does not implement the requested capability.
    #[error("Service '{service}' does not support {operation}")]
    Unsupported {
        service: String,
        operation: &'static str,
    },

    /// The remote API throttled us; retryable with the declared delay.
    #[error("Rate limited by the remote service (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// The addressed remote resource does not exist.
    #[error("Remote resource not found: {0}")]
    RemoteNotFound(String),

    /// A transient remote failure; safe to skip the affected item.
    #[error("Transient remote error: {0}")]
    RemoteTransient(String),

    /// Authentication failed; fatal, never retried.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The reference is owned by this service but cannot be acted on.
    #[error("Invalid reference: {0}")]
    BadRef(String),

    /// A non-classified HTTP-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote response did not have the expected shape.
    #[error("Failed to parse remote response: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Whether this error may be skipped for a single item of a bulk
    /// operation without aborting the batch.
    pub fn is_isolable(&self) -> bool {
        matches!(
            self,
            ServiceError::RemoteNotFound(_)
                | ServiceError::RemoteTransient(_)
                | ServiceError::Http(_)
                | ServiceError::Parse(_)
        )
    }
}

impl From<core_auth::AuthError> for ServiceError {
    fn from(err: core_auth::AuthError) -> Self {
        ServiceError::AuthenticationFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_unresolved_lists_known_services() {
        let err = ServiceError::RefUnresolved {
            input: "mystery".into(),
            known: vec!["spotify".into(), "file".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("mystery"));
        assert!(msg.contains("spotify, file"));
    }

    #[test]
    fn test_isolable_classification() {
        assert!(ServiceError::RemoteTransient("503".into()).is_isolable());
        assert!(ServiceError::RemoteNotFound("gone".into()).is_isolable());
        assert!(!ServiceError::AuthenticationFailed("expired".into()).is_isolable());
        assert!(!ServiceError::RateLimited { retry_after: None }.is_isolable());
    }

    #[test]
    fn test_auth_error_conversion() {
        let err: ServiceError = core_auth::AuthError::Failed("denied".into()).into();
        assert!(matches!(err, ServiceError::AuthenticationFailed(_)));
    }
}
