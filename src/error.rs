use std::time::Duration;
use thiserror::Error;

/// Unified error type for the cache subsystem.
///
/// Consumers almost never see these: the engine converts every failure on the
/// distributed path into a miss or a no-op and records it in the statistics.
/// The variants exist so the store layer can tell the engine *what* degraded.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("distributed store connection error: {0}")]
    Connection(String),

    #[error("distributed store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("distributed store is disabled for this process")]
    Disabled,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("distributed store backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// True when the error came from the network path rather than local logic.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            CacheError::Connection(_) | CacheError::Timeout(_) | CacheError::Backend(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classification() {
        assert!(CacheError::Connection("refused".into()).is_remote());
        assert!(CacheError::Timeout(Duration::from_secs(2)).is_remote());
        assert!(!CacheError::Disabled.is_remote());
    }

    #[test]
    fn test_display_includes_cause() {
        let err = CacheError::Backend("WRONGTYPE".into());
        assert!(err.to_string().contains("WRONGTYPE"));
    }
}
