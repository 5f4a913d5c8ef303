use aws_config::{AppName, BehaviorVersion, Region};
use aws_sdk_s3::{
    Client,
    config::Credentials,
    error::DisplayErrorContext,
    operation::{delete_objects::DeleteObjectsOutput, list_objects_v2::ListObjectsV2Output},
    types::{Delete, ObjectIdentifier},
};
use async_trait::async_trait;

use crate::{
    s3::s3_client_config::S3ClientConfig,
    storage::object_storage::{DeleteObjectError, DeleteObjectsOutcome, ListObjectsPage, ListObjectsRequest, ObjectKey, ObjectStorage},
};

/// [`ObjectStorage`] backed by the AWS S3 API.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    pub async fn connect(config: S3ClientConfig) -> anyhow::Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(endpoint) = config.endpoint() {
            loader = loader.endpoint_url(endpoint.as_str());
        }

        if let Some(region) = config.region() {
            loader = loader.region(Region::new(region.to_owned()));
        }

        if let Some((access_key, secret_key)) = config.static_credentials() {
            let creds = Credentials::new(access_key.to_owned(), secret_key.to_owned(), None, None, "static");
            loader = loader.credentials_provider(creds);
        }

        if let Some(app_name) = config.app_name() {
            loader = loader.app_name(AppName::new(app_name.to_owned())?);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style())
            .build();

        Ok(Self::from_client(Client::from_conf(s3_config)))
    }

    pub fn from_client(client: Client) -> Self {
        S3Client {
            client,
        }
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ObjectStorage for S3Client {
    async fn list_objects(&self, request: ListObjectsRequest) -> anyhow::Result<ListObjectsPage> {
        let output = self.client
            .list_objects_v2()
            .bucket(&request.bucket)
            .prefix(&request.prefix)
            .set_continuation_token(request.continuation_token.clone())
            .send()
            .await
            .map_err(|err| anyhow::anyhow!("ListObjectsV2 on s3://{}/{} failed: {}", request.bucket, request.prefix, DisplayErrorContext(&err)))?;

        list_page_from_output(output)
    }

    async fn delete_objects(&self, bucket: &str, keys: &[ObjectKey]) -> anyhow::Result<DeleteObjectsOutcome> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key.as_str()).build())
            .collect::<Result<Vec<_>, _>>()?;

        // Non-quiet mode so the response confirms every deleted key.
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(false)
            .build()?;

        let output = self.client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|err| anyhow::anyhow!("DeleteObjects on s3://{} failed: {}", bucket, DisplayErrorContext(&err)))?;

        Ok(delete_outcome_from_output(output))
    }
}

/// Maps one `ListObjectsV2` response. A missing `KeyCount` falls back to the
/// number of returned keys.
pub(crate) fn list_page_from_output(output: ListObjectsV2Output) -> anyhow::Result<ListObjectsPage> {
    let keys: Vec<ObjectKey> = output.contents()
        .iter()
        .filter_map(|object| object.key())
        .map(ObjectKey::from)
        .collect();

    let key_count = match output.key_count() {
        Some(count) => usize::try_from(count)?,
        None => keys.len(),
    };

    Ok(ListObjectsPage {
        key_count,
        keys,
        next_continuation_token: output.next_continuation_token().map(str::to_owned),
    })
}

/// Maps one `DeleteObjects` response. A response without a `Deleted` list stays
/// `None` so the caller sees it as zero confirmations.
pub(crate) fn delete_outcome_from_output(output: DeleteObjectsOutput) -> DeleteObjectsOutcome {
    let deleted = output.deleted.map(|deleted| {
        deleted
            .into_iter()
            .map(|object| ObjectKey::new(object.key.unwrap_or_default()))
            .collect()
    });

    let errors = output.errors
        .unwrap_or_default()
        .into_iter()
        .map(|error| DeleteObjectError {
            key: error.key.unwrap_or_default(),
            code: error.code.unwrap_or_default(),
            message: error.message.unwrap_or_default(),
        })
        .collect();

    DeleteObjectsOutcome { deleted, errors }
}
