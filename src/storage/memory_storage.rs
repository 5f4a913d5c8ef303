use std::{collections::{BTreeSet, HashMap}, ops::Bound, sync::{Mutex, MutexGuard, PoisonError}};

use async_trait::async_trait;

use crate::storage::object_storage::{DeleteObjectError, DeleteObjectsOutcome, ListObjectsPage, ListObjectsRequest, ObjectKey, ObjectStorage};

/// S3 caps a single listing page at 1000 keys.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Scripted misbehaviour for a single delete call.
#[derive(Debug, Clone)]
pub enum DeleteFault {
    /// The first key of the batch fails and stays in the bucket.
    KeyError { code: String, message: String },
    /// Every key is deleted but `n` confirmations are missing from the response.
    DropConfirmations(usize),
    /// Every key is deleted but the response carries no deleted list.
    MissingDeletedList,
    /// The request fails as a whole and nothing is deleted.
    Transport(String),
}

#[derive(Default)]
struct InMemoryState {
    objects: BTreeSet<String>,
    list_faults: HashMap<usize, String>,
    delete_faults: HashMap<usize, DeleteFault>,
    list_calls: usize,
    delete_batches: Vec<usize>,
}

/// Object store held in memory for a single bucket.
///
/// Pages are served in key order and the continuation token is the last key of
/// the previous page.
pub struct InMemoryStorage {
    bucket: String,
    page_size: usize,
    state: Mutex<InMemoryState>,
}

impl InMemoryStorage {
    pub fn new(bucket: impl AsRef<str>) -> Self {
        InMemoryStorage {
            bucket: bucket.as_ref().to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            state: Mutex::new(InMemoryState::default()),
        }
    }

    /// Default: `1000`
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_objects<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        {
            let mut state = self.lock();
            state.objects.extend(keys.into_iter().map(|key| key.as_ref().to_owned()));
        }
        self
    }

    pub fn put_object(&self, key: impl AsRef<str>) {
        self.lock().objects.insert(key.as_ref().to_owned());
    }

    /// Fails the `call`-th listing request (zero based).
    pub fn fail_list_call(&self, call: usize, message: impl AsRef<str>) {
        self.lock().list_faults.insert(call, message.as_ref().to_owned());
    }

    /// Applies `fault` to the `call`-th delete request (zero based).
    pub fn fail_delete_call(&self, call: usize, fault: DeleteFault) {
        self.lock().delete_faults.insert(call, fault);
    }

    pub fn keys_with_prefix(&self, prefix: impl AsRef<str>) -> Vec<String> {
        let prefix = prefix.as_ref();
        self.lock().objects.iter().filter(|key| key.starts_with(prefix)).cloned().collect()
    }

    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    /// Sizes of every delete request received, in order.
    pub fn delete_batches(&self) -> Vec<usize> {
        self.lock().delete_batches.clone()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_bucket(&self, bucket: &str) -> anyhow::Result<()> {
        if bucket != self.bucket {
            return Err(anyhow::anyhow!("NoSuchBucket: The specified bucket does not exist: {}", bucket));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn list_objects(&self, request: ListObjectsRequest) -> anyhow::Result<ListObjectsPage> {
        self.check_bucket(&request.bucket)?;
        let mut state = self.lock();
        let call = state.list_calls;
        state.list_calls += 1;

        if let Some(message) = state.list_faults.remove(&call) {
            return Err(anyhow::anyhow!("{}", message));
        }

        let lower = match &request.continuation_token {
            Some(token) => Bound::Excluded(token.as_str()),
            None => Bound::Included(request.prefix.as_str()),
        };

        let mut keys: Vec<ObjectKey> = state.objects
            .range::<str, _>((lower, Bound::Unbounded))
            .take_while(|key| key.starts_with(&request.prefix))
            .take(self.page_size + 1)
            .map(|key| ObjectKey::new(key.as_str()))
            .collect();

        let next_continuation_token = if keys.len() > self.page_size {
            keys.truncate(self.page_size);
            keys.last().map(|key| key.as_str().to_owned())
        } else {
            None
        };

        tracing::trace!("in-memory listing page {} returned {} keys", call, keys.len());
        Ok(ListObjectsPage {
            key_count: keys.len(),
            keys,
            next_continuation_token,
        })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[ObjectKey]) -> anyhow::Result<DeleteObjectsOutcome> {
        self.check_bucket(bucket)?;
        let mut state = self.lock();
        let call = state.delete_batches.len();
        state.delete_batches.push(keys.len());

        let fault = state.delete_faults.remove(&call);
        if let Some(DeleteFault::Transport(message)) = &fault {
            return Err(anyhow::anyhow!("{}", message));
        }

        let mut deleted = Vec::with_capacity(keys.len());
        let mut errors = Vec::new();
        for (index, key) in keys.iter().enumerate() {
            if index == 0 {
                if let Some(DeleteFault::KeyError { code, message }) = &fault {
                    errors.push(DeleteObjectError {
                        key: key.as_str().to_owned(),
                        code: code.clone(),
                        message: message.clone(),
                    });
                    continue;
                }
            }

            // Deleting a missing key still succeeds, as it does on S3.
            state.objects.remove(key.as_str());
            deleted.push(key.clone());
        }

        let deleted = match fault {
            Some(DeleteFault::MissingDeletedList) => None,
            Some(DeleteFault::DropConfirmations(dropped)) => {
                deleted.truncate(deleted.len().saturating_sub(dropped));
                Some(deleted)
            },
            _ => Some(deleted),
        };

        Ok(DeleteObjectsOutcome { deleted, errors })
    }
}
