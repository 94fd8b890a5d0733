use thiserror::Error;

/// Errors from the durable state store and the snapshot codec.
///
/// Local validation failures (empty rename target, orphan update, mutation
/// with no current session) are silent no-ops by design and never surface
/// through this type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Persistence(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors from the assessment backend HTTP client.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Non-2xx response. `message` is the body's `error` field when present,
    /// otherwise the HTTP status text.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Persistence("disk full".to_string());
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn test_serialization_error_display() {
        let err = StoreError::Serialization("missing field `answers`".to_string());
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_backend_api_error_display() {
        let err = BackendError::Api {
            status: 422,
            message: "ifrsStandard must be S1 or S2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "api error (422): ifrsStandard must be S1 or S2"
        );
    }

    #[test]
    fn test_backend_transport_error_display() {
        let err = BackendError::Transport("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
