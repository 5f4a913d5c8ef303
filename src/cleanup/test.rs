use std::{collections::BTreeSet, sync::{Arc, Mutex}};

use async_trait::async_trait;

use crate::{
    cleanup::{
        cleanup_config::CleanupConfig,
        cleanup_job::CleanupJob,
        cleanup_log::{LogMessage, LogSink},
        cleanup_report::CleanupReport,
        cleanup_state::CleanupState,
        object_lister::ObjectLister,
    },
    storage::{
        memory_storage::{DeleteFault, InMemoryStorage},
        object_storage::{DeleteObjectsOutcome, ListObjectsPage, ListObjectsRequest, ObjectKey, ObjectStorage},
    },
    utils::error::DataCleanupError,
};

const BUCKET: &str = "glue-output";
const PREFIX: &str = "glue/output/";

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<LogMessage>>,
}

impl RecordingSink {
    fn lines(&self) -> Vec<String> {
        self.messages.lock().unwrap().iter().flat_map(|m| m.lines().to_vec()).collect()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, message: LogMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

/// Serves canned pages in order and remembers every request it saw.
struct ScriptedListing {
    pages: Mutex<Vec<ListObjectsPage>>,
    requests: Mutex<Vec<ListObjectsRequest>>,
}

impl ScriptedListing {
    fn new(pages: Vec<ListObjectsPage>) -> Self {
        ScriptedListing {
            pages: Mutex::new(pages.into_iter().rev().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ObjectStorage for ScriptedListing {
    async fn list_objects(&self, request: ListObjectsRequest) -> anyhow::Result<ListObjectsPage> {
        self.requests.lock().unwrap().push(request);
        self.pages.lock().unwrap().pop().ok_or_else(|| anyhow::anyhow!("listed past the last page"))
    }

    async fn delete_objects(&self, _bucket: &str, _keys: &[ObjectKey]) -> anyhow::Result<DeleteObjectsOutcome> {
        Err(anyhow::anyhow!("listing only"))
    }
}

fn keys(range: std::ops::Range<usize>) -> Vec<ObjectKey> {
    range.map(|i| ObjectKey::new(format!("{}part-{:05}.parquet", PREFIX, i))).collect()
}

fn page(keys: Vec<ObjectKey>, token: Option<&str>) -> ListObjectsPage {
    ListObjectsPage {
        key_count: keys.len(),
        keys,
        next_continuation_token: token.map(str::to_owned),
    }
}

fn storage_with(count: usize) -> Arc<InMemoryStorage> {
    Arc::new(InMemoryStorage::new(BUCKET).with_objects(keys(0..count)))
}

fn config() -> CleanupConfig {
    CleanupConfig::builder().bucket(BUCKET).prefix(PREFIX).build().unwrap()
}

fn job(storage: &Arc<InMemoryStorage>, sink: &Arc<RecordingSink>) -> CleanupJob {
    CleanupJob::new(config(), storage.clone()).log_sink(sink.clone())
}

#[tokio::test]
async fn listing_collects_the_union_of_all_pages() {
    let storage = ScriptedListing::new(vec![
        page(keys(0..1000), Some("C1")),
        page(keys(1000..1500), None),
    ]);

    let mut pending = BTreeSet::new();
    let mut lister = ObjectLister::new(&storage, BUCKET, PREFIX);
    lister.collect_into(&mut pending).await.unwrap();

    assert_eq!(pending.len(), 1500);
    assert_eq!(lister.pages(), 2);

    let requests = storage.requests.lock().unwrap();
    assert!(requests[0].continuation_token.is_none());
    assert_eq!(requests[1].continuation_token.as_deref(), Some("C1"));
    assert!(requests.iter().all(|r| r.bucket == BUCKET && r.prefix == PREFIX));
}

#[tokio::test]
async fn listing_deduplicates_repeated_keys() {
    let storage = ScriptedListing::new(vec![
        page(keys(0..10), Some("C1")),
        page(keys(5..15), None),
    ]);

    let mut pending = BTreeSet::new();
    ObjectLister::new(&storage, BUCKET, PREFIX).collect_into(&mut pending).await.unwrap();

    assert_eq!(pending, keys(0..15).into_iter().collect::<BTreeSet<_>>());
}

#[tokio::test]
async fn listing_continues_past_an_empty_page() {
    let storage = ScriptedListing::new(vec![
        ListObjectsPage { key_count: 0, keys: Vec::new(), next_continuation_token: Some(String::from("C1")) },
        page(keys(0..3), None),
    ]);

    let mut pending = BTreeSet::new();
    ObjectLister::new(&storage, BUCKET, PREFIX).collect_into(&mut pending).await.unwrap();

    assert_eq!(pending.len(), 3);
}

#[tokio::test]
async fn deletes_in_batches_of_at_most_five_hundred() {
    let storage = storage_with(1200);
    let sink = Arc::new(RecordingSink::default());

    let report = job(&storage, &sink).run().await.unwrap();

    assert_eq!(storage.delete_batches(), vec![500, 500, 200]);
    assert_eq!(report.batches, vec![500, 500, 200]);
    assert_eq!(report.enumerated, 1200);
    assert_eq!(report.deleted, 1200);
    assert_eq!(report.list_pages, 2);
    assert!(storage.keys_with_prefix(PREFIX).is_empty());
}

#[tokio::test]
async fn objects_outside_the_prefix_are_left_alone() {
    let storage = Arc::new(
        InMemoryStorage::new(BUCKET)
            .with_objects(keys(0..3))
            .with_objects(["glue/other/part-0.parquet", "glue/output-archive/x"]),
    );
    let sink = Arc::new(RecordingSink::default());

    job(&storage, &sink).run().await.unwrap();

    assert_eq!(storage.object_count(), 2);
    assert_eq!(storage.keys_with_prefix("glue/other/").len(), 1);
}

#[tokio::test]
async fn progress_goes_to_the_log_sink() {
    let storage = storage_with(1200);
    let sink = Arc::new(RecordingSink::default());

    job(&storage, &sink).run().await.unwrap();

    let lines = sink.lines();
    assert_eq!(lines[0], format!("Looking for previously generated output files: s3://{}/{}", BUCKET, PREFIX));
    assert!(lines.contains(&String::from("Number of previously generated output files: 1200")));
    assert!(lines.contains(&String::from("Successfully deleted 500 objects. Number still left to delete: 700")));
    assert_eq!(lines.last().unwrap(), "Successfully deleted 200 objects. Number still left to delete: 0");
}

#[tokio::test]
async fn per_key_error_aborts_without_further_batches() {
    let storage = storage_with(1200);
    storage.fail_delete_call(0, DeleteFault::KeyError { code: String::from("AccessDenied"), message: String::from("Access Denied") });
    let sink = Arc::new(RecordingSink::default());
    let mut job = job(&storage, &sink);
    let mut commits = 0;

    let result = job.run_and_commit(&mut |_: &CleanupReport| commits += 1).await;

    assert!(matches!(result, Err(DataCleanupError::PartialDelete { ref code, .. }) if code == "AccessDenied"));
    assert_eq!(storage.delete_batches(), vec![500]);
    assert_eq!(job.state(), CleanupState::Failed);
    assert_eq!(commits, 0);
}

#[tokio::test]
async fn confirmed_count_mismatch_names_both_numbers() {
    let storage = storage_with(1200);
    storage.fail_delete_call(0, DeleteFault::DropConfirmations(20));
    let sink = Arc::new(RecordingSink::default());

    let err = job(&storage, &sink).run().await.unwrap_err();

    assert!(matches!(err, DataCleanupError::CountMismatch { expected: 500, actual: 480 }));
    let message = err.to_string();
    assert!(message.contains("500") && message.contains("480"));
    assert_eq!(storage.delete_batches().len(), 1);
}

#[tokio::test]
async fn missing_confirmation_list_is_fatal() {
    let storage = storage_with(10);
    storage.fail_delete_call(0, DeleteFault::MissingDeletedList);
    let sink = Arc::new(RecordingSink::default());

    let err = job(&storage, &sink).run().await.unwrap_err();

    assert!(matches!(err, DataCleanupError::CountMismatch { expected: 10, actual: 0 }));
}

#[tokio::test]
async fn delete_transport_error_stops_the_drain() {
    let storage = storage_with(1200);
    storage.fail_delete_call(1, DeleteFault::Transport(String::from("SlowDown")));
    let sink = Arc::new(RecordingSink::default());

    let err = job(&storage, &sink).run().await.unwrap_err();

    assert!(matches!(err, DataCleanupError::Deletion(_)));
    assert_eq!(err.error_code(), "cleanup.deletion_failed");
    assert_eq!(storage.delete_batches(), vec![500, 500]);
    assert_eq!(storage.keys_with_prefix(PREFIX).len(), 700);
}

#[tokio::test]
async fn batches_are_drawn_in_key_order() {
    let storage = storage_with(1200);
    storage.fail_delete_call(1, DeleteFault::Transport(String::from("SlowDown")));
    let sink = Arc::new(RecordingSink::default());

    let _ = job(&storage, &sink).run().await;

    let remaining = storage.keys_with_prefix(PREFIX);
    assert_eq!(remaining.first().map(String::as_str), Some("glue/output/part-00500.parquet"));
}

#[tokio::test]
async fn listing_failure_prevents_any_deletion() {
    let storage = storage_with(1500);
    storage.fail_list_call(1, "AccessDenied: listing page 2");
    let sink = Arc::new(RecordingSink::default());
    let mut job = job(&storage, &sink);

    let err = job.run().await.unwrap_err();

    assert!(matches!(err, DataCleanupError::Listing(_)));
    assert!(storage.delete_batches().is_empty());
    assert_eq!(storage.object_count(), 1500);
    assert_eq!(job.state(), CleanupState::Failed);
}

#[tokio::test]
async fn empty_prefix_succeeds_without_deleting() {
    let storage = Arc::new(InMemoryStorage::new(BUCKET).with_objects(["glue/other/a"]));
    let sink = Arc::new(RecordingSink::default());
    let mut job = job(&storage, &sink);
    let mut committed = Vec::new();

    let report = job.run_and_commit(&mut |report: &CleanupReport| committed.push(report.clone())).await.unwrap();

    assert_eq!(report.enumerated, 0);
    assert!(report.batches.is_empty());
    assert!(storage.delete_batches().is_empty());
    assert_eq!(job.state(), CleanupState::Done);
    assert_eq!(committed, vec![report]);
}

#[tokio::test]
async fn second_run_finds_nothing_to_delete() {
    let storage = storage_with(750);
    let sink = Arc::new(RecordingSink::default());

    let first = job(&storage, &sink).run().await.unwrap();
    let second = job(&storage, &sink).run().await.unwrap();

    assert_eq!(first.deleted, 750);
    assert_eq!(second.enumerated, 0);
    assert_eq!(second.deleted, 0);
    assert_eq!(storage.delete_batches(), vec![500, 250]);
}

#[tokio::test]
async fn rerun_after_partial_failure_finishes_the_job() {
    let storage = storage_with(1200);
    storage.fail_delete_call(1, DeleteFault::Transport(String::from("SlowDown")));
    let sink = Arc::new(RecordingSink::default());

    assert!(job(&storage, &sink).run().await.is_err());
    let report = job(&storage, &sink).run().await.unwrap();

    assert_eq!(report.enumerated, 700);
    assert!(storage.keys_with_prefix(PREFIX).is_empty());
}

#[tokio::test]
async fn finished_job_refuses_to_run_again() {
    let storage = storage_with(3);
    let sink = Arc::new(RecordingSink::default());
    let mut job = job(&storage, &sink);

    job.run().await.unwrap();
    let err = job.run().await.unwrap_err();

    assert!(matches!(err, DataCleanupError::InvalidState { state: CleanupState::Done }));
    assert_eq!(storage.list_calls(), 1);
}

#[tokio::test]
async fn smaller_batch_size_is_honoured() {
    let storage = storage_with(25);
    let sink = Arc::new(RecordingSink::default());
    let config = CleanupConfig::builder().bucket(BUCKET).prefix(PREFIX).batch_size(10).build().unwrap();

    CleanupJob::new(config, storage.clone()).log_sink(sink).run().await.unwrap();

    assert_eq!(storage.delete_batches(), vec![10, 10, 5]);
}

#[tokio::test]
async fn rerun_removes_only_objects_written_since() {
    let storage = storage_with(600);
    let sink = Arc::new(RecordingSink::default());

    job(&storage, &sink).run().await.unwrap();
    storage.put_object(format!("{}late-part.parquet", PREFIX));
    let report = job(&storage, &sink).run().await.unwrap();

    assert_eq!(report.enumerated, 1);
    assert_eq!(report.batches, vec![1]);
    assert_eq!(storage.delete_batches(), vec![500, 100, 1]);
    assert!(storage.keys_with_prefix(PREFIX).is_empty());
}
