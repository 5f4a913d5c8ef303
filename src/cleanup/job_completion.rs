use crate::cleanup::cleanup_report::CleanupReport;

/// Signals the surrounding job framework that cleanup finished.
///
/// Called exactly once per job, and only after every enumerated object has been
/// confirmed deleted.
pub trait JobCompletion {
    fn commit(&mut self, report: &CleanupReport);
}

/// Completion that only records the commit in the log.
#[derive(Debug, Default)]
pub struct LogCompletion;

impl JobCompletion for LogCompletion {
    fn commit(&mut self, report: &CleanupReport) {
        tracing::info!(
            bucket = %report.bucket,
            prefix = %report.prefix,
            deleted = report.deleted,
            batches = report.batches.len(),
            "cleanup committed"
        );
    }
}

impl<F> JobCompletion for F
where
    F: FnMut(&CleanupReport),
{
    fn commit(&mut self, report: &CleanupReport) {
        self(report)
    }
}
