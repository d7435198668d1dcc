use crate::store::StoreError;
use thiserror::Error;

/// Errors returned by adapter operations
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("rule of type {ptype} has {count} fields, at most 6 are supported")]
    TooManyFields { ptype: String, count: usize },
    #[error("field index {0} is out of range, expected 0..=5")]
    InvalidFieldIndex(usize),
    #[error("unexpected number of batch deletes: {actual} when expected {expected}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("rule write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type AdapterResult<T> = Result<T, AdapterError>;

impl From<AdapterError> for casbin::Error {
    fn from(err: AdapterError) -> Self {
        casbin::error::AdapterError(Box::new(err)).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        let errors = vec![
            AdapterError::TooManyFields {
                ptype: "p".to_string(),
                count: 7,
            },
            AdapterError::InvalidFieldIndex(9),
            AdapterError::CountMismatch {
                expected: 3,
                actual: 1,
            },
            AdapterError::Store(StoreError::ConditionalCheckFailed),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn test_count_mismatch_message() {
        let err = AdapterError::CountMismatch {
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "unexpected number of batch deletes: 1 when expected 2"
        );
    }

    #[test]
    fn test_converts_to_casbin_error() {
        let err: casbin::Error = AdapterError::InvalidFieldIndex(6).into();
        assert!(matches!(err, casbin::Error::AdapterError(_)));
        assert!(err.to_string().contains("field index 6"));
    }

    #[test]
    fn test_store_error_converts() {
        let err: AdapterError = StoreError::Backend(anyhow::anyhow!("timeout")).into();
        assert!(matches!(err, AdapterError::Store(StoreError::Backend(_))));
        assert!(err.to_string().contains("timeout"));
    }
}
