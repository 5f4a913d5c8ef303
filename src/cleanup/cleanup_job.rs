use std::{collections::BTreeSet, sync::Arc};

use crate::{
    cleanup::{
        batch_deleter::BatchDeleter,
        cleanup_config::CleanupConfig,
        cleanup_log::{LogSink, TracingLogSink},
        cleanup_report::CleanupReport,
        cleanup_state::CleanupState,
        job_completion::JobCompletion,
        object_lister::ObjectLister,
    },
    storage::object_storage::{ObjectKey, ObjectStorage},
    utils::error::DataCleanupError,
};

/// Removes the output of a previous run before a new run writes its own.
///
/// The whole prefix is listed first, and deletion only starts once listing has
/// finished without error. Running the job again is safe: it re-lists from the
/// current state of the bucket and finds whatever is left.
pub struct CleanupJob {
    config: CleanupConfig,
    storage: Arc<dyn ObjectStorage>,
    sink: Arc<dyn LogSink>,
    state: CleanupState,
}

impl CleanupJob {
    pub fn new(config: CleanupConfig, storage: Arc<dyn ObjectStorage>) -> Self {
        CleanupJob {
            config,
            storage,
            sink: Arc::new(TracingLogSink),
            state: CleanupState::Listing,
        }
    }

    /// Replace where progress messages go.
    ///
    /// Default: [`TracingLogSink`]
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn state(&self) -> CleanupState {
        self.state
    }

    /// Runs the cleanup and signals `completion` once it succeeds.
    pub async fn run_and_commit<C: JobCompletion>(&mut self, completion: &mut C) -> Result<CleanupReport, DataCleanupError> {
        let report = self.run().await?;
        completion.commit(&report);
        Ok(report)
    }

    pub async fn run(&mut self) -> Result<CleanupReport, DataCleanupError> {
        if self.state != CleanupState::Listing {
            return Err(DataCleanupError::InvalidState { state: self.state });
        }

        match self.execute().await {
            Ok(report) => {
                self.transition(CleanupState::Done);
                Ok(report)
            },
            Err(err) => {
                self.transition(CleanupState::Failed);
                Err(err)
            },
        }
    }

    async fn execute(&mut self) -> Result<CleanupReport, DataCleanupError> {
        let storage = Arc::clone(&self.storage);
        let sink = Arc::clone(&self.sink);
        let bucket = self.config.bucket().to_owned();
        let prefix = self.config.prefix().to_owned();

        sink.log(format!("Looking for previously generated output files: s3://{}/{}", bucket, prefix).into());

        let mut pending: BTreeSet<ObjectKey> = BTreeSet::new();
        let mut lister = ObjectLister::new(storage.as_ref(), &bucket, &prefix);
        lister.collect_into(&mut pending).await?;

        let enumerated = pending.len();
        sink.log(format!("Number of previously generated output files: {}", enumerated).into());

        let mut report = CleanupReport {
            bucket: bucket.clone(),
            prefix: prefix.clone(),
            list_pages: lister.pages(),
            enumerated,
            ..CleanupReport::default()
        };

        if pending.is_empty() {
            return Ok(report);
        }

        self.transition(CleanupState::Deleting);
        let mut deleter = BatchDeleter::new(storage.as_ref(), sink.as_ref(), &bucket, self.config.batch_size());
        deleter.drain(&mut pending).await?;

        report.batches = deleter.into_batches();
        report.deleted = report.batches.iter().sum();
        Ok(report)
    }

    fn transition(&mut self, next: CleanupState) {
        tracing::trace!("cleanup state {} -> {}", self.state, next);
        self.state = next;
    }
}
