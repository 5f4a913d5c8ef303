use std::collections::BTreeSet;

use crate::{storage::object_storage::{ListObjectsRequest, ObjectKey, ObjectStorage}, utils::error::DataCleanupError};

/// Enumerates every key under a prefix, following continuation tokens until the
/// storage stops returning one.
pub struct ObjectLister<'a> {
    storage: &'a dyn ObjectStorage,
    bucket: &'a str,
    prefix: &'a str,
    pages: usize,
}

impl<'a> ObjectLister<'a> {
    pub fn new(storage: &'a dyn ObjectStorage, bucket: &'a str, prefix: &'a str) -> Self {
        ObjectLister {
            storage,
            bucket,
            prefix,
            pages: 0,
        }
    }

    /// Number of listing pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Adds every listed key to `pending`. Any storage error aborts the listing;
    /// keys already added must not be acted on by the caller.
    pub async fn collect_into(&mut self, pending: &mut BTreeSet<ObjectKey>) -> Result<(), DataCleanupError> {
        let mut request = ListObjectsRequest::new(self.bucket, self.prefix);

        loop {
            let page = self.storage
                .list_objects(request.clone())
                .await
                .map_err(DataCleanupError::Listing)?;
            self.pages += 1;

            tracing::debug!(
                page = self.pages,
                key_count = page.key_count,
                more = page.next_continuation_token.is_some(),
                "listed page under s3://{}/{}", self.bucket, self.prefix
            );

            if page.key_count > 0 {
                pending.extend(page.keys);
            }

            match page.next_continuation_token {
                Some(token) => request.continuation_token = Some(token),
                None => break,
            }
        }

        Ok(())
    }
}
