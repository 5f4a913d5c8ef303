pub mod cleanup;
pub mod storage;
pub mod utils;

#[cfg(feature = "s3")]
pub mod s3;

pub use cleanup::{
    cleanup_config::CleanupConfig,
    cleanup_job::CleanupJob,
    cleanup_log::{LogMessage, LogSink, TracingLogSink},
    cleanup_report::CleanupReport,
    cleanup_state::CleanupState,
    job_completion::{JobCompletion, LogCompletion},
};
pub use storage::object_storage::{ObjectKey, ObjectStorage};
pub use utils::error::DataCleanupError;
