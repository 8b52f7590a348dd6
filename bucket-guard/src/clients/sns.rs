use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_sns as sns;
use aws_sdk_sns::error::DisplayErrorContext;

use super::AlertPublisher;

pub struct SnsPublisher {
    client: sns::Client,
}

impl SnsPublisher {
    pub fn new(conf: &aws_config::SdkConfig) -> Self {
        Self { client: sns::Client::new(conf) }
    }

    pub fn from_client(client: sns::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AlertPublisher for SnsPublisher {
    fn name(&self) -> &'static str {
        "sns"
    }

    async fn publish(&self, destination: &str, subject: &str, body: &str) -> Result<String> {
        let out = self
            .client
            .publish()
            .topic_arn(destination)
            .subject(subject)
            .message(body)
            .send()
            .await
            .map_err(|err| anyhow!("Publish({destination}): {}", DisplayErrorContext(&err)))?;

        Ok(out.message_id().unwrap_or_default().to_string())
    }
}
