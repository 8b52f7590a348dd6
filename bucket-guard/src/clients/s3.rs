use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_public_access_block::GetPublicAccessBlockError;
use aws_sdk_s3::types::PublicAccessBlockConfiguration;

use super::PostureStore;
use crate::types::AccessPosture;

/// Error code S3 returns when a bucket has never had a public access block.
pub const NO_CONFIGURATION_CODE: &str = "NoSuchPublicAccessBlockConfiguration";

pub struct S3PostureStore {
    client: s3::Client,
}

impl S3PostureStore {
    pub fn new(conf: &aws_config::SdkConfig) -> Self {
        Self { client: s3::Client::new(conf) }
    }

    pub fn from_client(client: s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PostureStore for S3PostureStore {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn get(&self, bucket: &str) -> Result<Option<AccessPosture>> {
        let r = self.client.get_public_access_block().bucket(bucket).send().await;
        match r {
            Ok(v) => Ok(v.public_access_block_configuration().map(posture_from)),
            Err(err) => read_error(bucket, err),
        }
    }

    async fn set(&self, bucket: &str, posture: AccessPosture) -> Result<()> {
        let cfg = PublicAccessBlockConfiguration::builder()
            .block_public_acls(posture.block_public_acls)
            .ignore_public_acls(posture.ignore_public_acls)
            .block_public_policy(posture.block_public_policy)
            .restrict_public_buckets(posture.restrict_public_buckets)
            .build();

        self.client
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(cfg)
            .send()
            .await
            .map_err(|err| {
                anyhow!("PutPublicAccessBlock({bucket}): {}", DisplayErrorContext(&err))
            })?;
        Ok(())
    }
}

// A bucket without a public access block is a normal answer, not a failure.
fn read_error<R>(
    bucket: &str,
    err: SdkError<GetPublicAccessBlockError, R>,
) -> Result<Option<AccessPosture>>
where
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err.as_service_error().and_then(|e| e.code());
    if code == Some(NO_CONFIGURATION_CODE) {
        return Ok(None);
    }
    Err(anyhow!("GetPublicAccessBlock({bucket}): {}", DisplayErrorContext(&err)))
}

// A switch S3 leaves out is treated as off.
fn posture_from(c: &PublicAccessBlockConfiguration) -> AccessPosture {
    AccessPosture {
        block_public_acls: c.block_public_acls().unwrap_or(false),
        ignore_public_acls: c.ignore_public_acls().unwrap_or(false),
        block_public_policy: c.block_public_policy().unwrap_or(false),
        restrict_public_buckets: c.restrict_public_buckets().unwrap_or(false),
    }
}
