/// Bulk delete requests are capped at this many keys.
pub const MAX_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone)]
pub struct CleanupConfig {
    bucket: String,
    prefix: String,
    batch_size: usize,
}

impl CleanupConfig {
    pub fn builder() -> CleanupConfigBuilder {
        CleanupConfigBuilder {
            bucket: None,
            prefix: None,
            batch_size: None,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

pub struct CleanupConfigBuilder {
    bucket: Option<String>,
    prefix: Option<String>,
    batch_size: Option<usize>,
}

impl CleanupConfigBuilder {
    pub fn build(self) -> anyhow::Result<CleanupConfig> {
        let bucket = match self.bucket {
            Some(bucket) if !bucket.trim().is_empty() => bucket,
            _ => return Err(anyhow::anyhow!("bucket is required")),
        };

        let prefix = match self.prefix {
            Some(prefix) if !prefix.trim().is_empty() => prefix,
            _ => return Err(anyhow::anyhow!("prefix is required")),
        };

        let batch_size = self.batch_size.unwrap_or(MAX_BATCH_SIZE);
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(anyhow::anyhow!("batch_size must be between 1 and {}, got {}", MAX_BATCH_SIZE, batch_size));
        }

        Ok(CleanupConfig {
            bucket,
            prefix,
            batch_size,
        })
    }

    /// **Required**
    pub fn bucket(mut self, bucket: impl AsRef<str>) -> Self {
        self.bucket = Some(bucket.as_ref().to_owned());
        self
    }

    /// **Required**
    ///
    /// Every object whose key starts with this prefix is deleted.
    pub fn prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.prefix = Some(prefix.as_ref().to_owned());
        self
    }

    /// **Optional**
    ///
    /// Default: `500`
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}
