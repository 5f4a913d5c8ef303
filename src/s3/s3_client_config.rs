use aws_config::AppName;
use url::Url;

#[derive(Debug, Clone)]
pub struct S3ClientConfig {
    endpoint: Option<Url>,
    region: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
    force_path_style: bool,
    app_name: Option<String>,
}

impl S3ClientConfig {
    pub fn builder() -> S3ClientConfigBuilder {
        S3ClientConfigBuilder {
            endpoint: None,
            region: None,
            access_key: None,
            secret_key: None,
            force_path_style: false,
            solution_id: None,
            solution_version: None,
        }
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Static credentials, present only when both keys were given.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key, &self.secret_key) {
            (Some(access_key), Some(secret_key)) => Some((access_key, secret_key)),
            _ => None,
        }
    }

    pub fn force_path_style(&self) -> bool {
        self.force_path_style
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }
}

pub struct S3ClientConfigBuilder {
    endpoint: Option<String>,
    region: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
    force_path_style: bool,
    solution_id: Option<String>,
    solution_version: Option<String>,
}

impl S3ClientConfigBuilder {
    pub fn build(self) -> anyhow::Result<S3ClientConfig> {
        let endpoint_url = match self.endpoint {
            Some(url) => Some(Url::parse(&url)?),
            None => None,
        };

        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(anyhow::anyhow!("access_key and secret_key must be set together"));
        }

        let app_name = match (self.solution_id, self.solution_version) {
            (Some(id), Some(version)) if !id.trim().is_empty() && !version.trim().is_empty() => {
                let name = format!("AwsSolution-{}-{}", id.trim(), version.trim());
                AppName::new(name.clone())?;
                Some(name)
            },
            _ => None,
        };

        Ok(S3ClientConfig {
            endpoint: endpoint_url,
            region: self.region,
            access_key: self.access_key,
            secret_key: self.secret_key,
            force_path_style: self.force_path_style,
            app_name,
        })
    }

    /// **Optional**
    /// 
    /// Not required for AWS, but should be set for other S3 solutions.
    pub fn endpoint(mut self, endpoint: impl AsRef<str>) -> Self {
        self.endpoint = Some(endpoint.as_ref().to_owned());
        self
    }

    /// **Optional**
    /// 
    /// Default: resolved from the environment.
    pub fn region(mut self, region: impl AsRef<str>) -> Self {
        self.region = Some(region.as_ref().to_owned());
        self
    }

    /// **Optional**
    /// 
    /// Without static keys the default AWS credential chain is used.
    pub fn access_key(mut self, access_key: impl AsRef<str>) -> Self {
        self.access_key = Some(access_key.as_ref().to_owned());
        self
    }

    /// **Optional**
    pub fn secret_key(mut self, secret_key: impl AsRef<str>) -> Self {
        self.secret_key = Some(secret_key.as_ref().to_owned());
        self
    }

    /// **Optional**
    /// 
    /// Default: `false`. Most self-hosted S3 solutions need this.
    pub fn force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    /// **Optional**
    /// 
    /// Tags the user agent with `AwsSolution-<id>-<version>`. Ignored unless both are non-blank.
    pub fn solution(mut self, id: impl AsRef<str>, version: impl AsRef<str>) -> Self {
        self.solution_id = Some(id.as_ref().to_owned());
        self.solution_version = Some(version.as_ref().to_owned());
        self
    }
}
