pub mod s3;
pub mod sns;

use anyhow::Result;
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_types::region::Region;

use crate::types::AccessPosture;

pub use s3::S3PostureStore;
pub use sns::SnsPublisher;

/// Shared SDK config for both clients. Retries live here and nowhere else.
pub async fn load_sdk_config(max_attempts: u32, region: Option<String>) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(RetryConfig::standard().with_max_attempts(max_attempts));
    if let Some(r) = region {
        loader = loader.region(Region::new(r));
    }
    loader.load().await
}

/// Read/write access to a bucket's public access block.
#[async_trait]
pub trait PostureStore: Send + Sync {
    fn name(&self) -> &'static str;
    /// `Ok(None)` means the bucket has no public access block at all.
    async fn get(&self, bucket: &str) -> Result<Option<AccessPosture>>;
    async fn set(&self, bucket: &str, posture: AccessPosture) -> Result<()>;
}

/// Delivers a message to an alerting channel and returns its message id.
#[async_trait]
pub trait AlertPublisher: Send + Sync {
    fn name(&self) -> &'static str;
    async fn publish(&self, destination: &str, subject: &str, body: &str) -> Result<String>;
}
