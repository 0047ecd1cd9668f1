use aws_sdk_s3::config::Builder;
use aws_sdk_s3::{config::BehaviorVersion, config::Credentials, config::Region, Client};
use bytes::Bytes;
use tracing::info;

#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
    pub bucket: String,
}

impl StorageService {
    pub async fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .build();

        let client = Client::from_conf(config);

        info!("✅ Connected to S3 (MinIO)");

        Self {
            client,
            bucket: bucket.to_string(),
        }
    }

    /// Create the bucket when it does not exist yet, so a fresh MinIO
    /// instance works without manual provisioning.
    pub async fn ensure_bucket(&self) -> Result<(), aws_sdk_s3::Error> {
        match self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(_) => {}
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    self.client
                        .create_bucket()
                        .bucket(&self.bucket)
                        .send()
                        .await?;
                    info!("Bucket '{}' created", self.bucket);
                } else {
                    return Err(service_err.into());
                }
            }
        }

        info!("Bucket '{}' is ready", self.bucket);
        Ok(())
    }

    pub async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), aws_sdk_s3::Error> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(aws_sdk_s3::primitives::ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await?;

        Ok(())
    }

    pub async fn get_object(&self, key: &str) -> Result<Bytes, anyhow::Error> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        let data = output.body.collect().await?.into_bytes();
        Ok(data)
    }

    pub async fn delete_object(&self, key: &str) -> Result<(), aws_sdk_s3::Error> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;

        Ok(())
    }
}
