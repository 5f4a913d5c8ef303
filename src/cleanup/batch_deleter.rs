use std::collections::BTreeSet;

use crate::{
    cleanup::{cleanup_config::MAX_BATCH_SIZE, cleanup_log::LogSink},
    storage::object_storage::{DeleteObjectsOutcome, ObjectKey, ObjectStorage},
    utils::error::DataCleanupError,
};

/// Drains a pending set through bulk delete requests of at most `batch_size` keys.
///
/// `batch_size` is clamped to `1..=MAX_BATCH_SIZE`.
pub struct BatchDeleter<'a> {
    storage: &'a dyn ObjectStorage,
    sink: &'a dyn LogSink,
    bucket: &'a str,
    batch_size: usize,
    batches: Vec<usize>,
}

impl<'a> BatchDeleter<'a> {
    pub fn new(storage: &'a dyn ObjectStorage, sink: &'a dyn LogSink, bucket: &'a str, batch_size: usize) -> Self {
        BatchDeleter {
            storage,
            sink,
            bucket,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
            batches: Vec::new(),
        }
    }

    pub fn into_batches(self) -> Vec<usize> {
        self.batches
    }

    /// Deletes every key in `pending`. Keys leave the set only once the storage
    /// has confirmed their batch. The first failed batch ends the drain.
    pub async fn drain(&mut self, pending: &mut BTreeSet<ObjectKey>) -> Result<(), DataCleanupError> {
        while !pending.is_empty() {
            let batch: Vec<ObjectKey> = pending.iter().take(self.batch_size).cloned().collect();

            self.sink.log(format!("Attempting to delete batch of previously generated data. Number of objects to delete: {}", batch.len()).into());

            let outcome = self.storage
                .delete_objects(self.bucket, &batch)
                .await
                .map_err(DataCleanupError::Deletion)?;
            verify(&batch, &outcome)?;

            for key in &batch {
                pending.remove(key);
            }
            self.batches.push(batch.len());

            tracing::debug!(batch = self.batches.len(), size = batch.len(), remaining = pending.len(), "batch confirmed");
            self.sink.log(format!("Successfully deleted {} objects. Number still left to delete: {}", batch.len(), pending.len()).into());
        }

        Ok(())
    }
}

fn verify(batch: &[ObjectKey], outcome: &DeleteObjectsOutcome) -> Result<(), DataCleanupError> {
    if let Some(error) = outcome.errors.first() {
        return Err(DataCleanupError::PartialDelete {
            key: error.key.clone(),
            code: error.code.clone(),
            message: error.message.clone(),
        });
    }

    let actual = outcome.deleted_count();
    if actual != batch.len() {
        return Err(DataCleanupError::CountMismatch {
            expected: batch.len(),
            actual,
        });
    }

    Ok(())
}
