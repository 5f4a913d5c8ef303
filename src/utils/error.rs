use thiserror::Error;

use crate::cleanup::cleanup_state::CleanupState;

/// Raised when previous job output could not be removed from the object store.
///
/// Every failure of the cleanup is reported through this type so callers can tell
/// "cleanup failed" apart from any other error in the surrounding pipeline.
#[derive(Debug, Error)]
pub enum DataCleanupError {
    #[error("Error while listing previous job output: {0:#}")]
    Listing(#[source] anyhow::Error),

    #[error("Error while cleaning previous job output: {0:#}")]
    Deletion(#[source] anyhow::Error),

    #[error("Error while cleaning previous job output: {{Key: {key}, Code: {code}, Message: {message}}}")]
    PartialDelete {
        key: String,
        code: String,
        message: String,
    },

    #[error("Error while cleaning previous job output. Expecting {expected} to be deleted but storage reported {actual} were deleted")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Cleanup job cannot run from state {state}")]
    InvalidState { state: CleanupState },
}

impl DataCleanupError {
    pub fn error_code(&self) -> &'static str {
        match self {
            DataCleanupError::Listing(_) => "cleanup.listing_failed",
            DataCleanupError::Deletion(_) => "cleanup.deletion_failed",
            DataCleanupError::PartialDelete { .. } => "cleanup.partial_delete",
            DataCleanupError::CountMismatch { .. } => "cleanup.count_mismatch",
            DataCleanupError::InvalidState { .. } => "cleanup.invalid_state",
        }
    }
}
