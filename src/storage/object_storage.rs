use std::fmt;

use async_trait::async_trait;

/// Opaque identifier of one stored object within a bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(key: impl Into<String>) -> Self {
        ObjectKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectKey {
    fn from(key: &str) -> Self {
        ObjectKey::new(key)
    }
}

impl From<String> for ObjectKey {
    fn from(key: String) -> Self {
        ObjectKey(key)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct ListObjectsRequest {
    pub bucket: String,
    pub prefix: String,
    pub continuation_token: Option<String>,
}

impl ListObjectsRequest {
    pub fn new(bucket: impl AsRef<str>, prefix: impl AsRef<str>) -> Self {
        ListObjectsRequest {
            bucket: bucket.as_ref().to_owned(),
            prefix: prefix.as_ref().to_owned(),
            continuation_token: None,
        }
    }

    pub fn continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }
}

/// One page of a prefix listing.
///
/// `next_continuation_token` is present only while more pages remain.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsPage {
    pub key_count: usize,
    pub keys: Vec<ObjectKey>,
    pub next_continuation_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteObjectError {
    pub key: String,
    pub code: String,
    pub message: String,
}

/// Result of a bulk delete request.
///
/// `deleted` is `None` when the service returned no confirmation list at all.
#[derive(Debug, Clone, Default)]
pub struct DeleteObjectsOutcome {
    pub deleted: Option<Vec<ObjectKey>>,
    pub errors: Vec<DeleteObjectError>,
}

impl DeleteObjectsOutcome {
    pub fn deleted_count(&self) -> usize {
        self.deleted.as_ref().map_or(0, Vec::len)
    }
}

/// The storage operations the cleanup needs: a paginated prefix listing and a
/// bulk delete with per-key error reporting.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn list_objects(&self, request: ListObjectsRequest) -> anyhow::Result<ListObjectsPage>;

    /// Deletes every key in one request. Per-key failures are reported in the
    /// outcome, not as an `Err`.
    async fn delete_objects(&self, bucket: &str, keys: &[ObjectKey]) -> anyhow::Result<DeleteObjectsOutcome>;
}
