use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::clients::PostureStore;
use crate::types::{AccessPosture, PostureReading};

#[derive(Error, Debug)]
#[error("failed to remediate {bucket}: {source}")]
pub struct RemediationError {
    pub bucket: String,
    #[source]
    pub source: anyhow::Error,
}

/// Reads a bucket's public access block and locks it down when needed.
pub struct PostureGuard {
    store: Arc<dyn PostureStore>,
}

impl PostureGuard {
    pub fn new(store: Arc<dyn PostureStore>) -> Self {
        Self { store }
    }

    /// Never fails: a missing configuration or a failed read both come back
    /// as readings that count as public.
    pub async fn read_posture(&self, bucket: &str) -> PostureReading {
        let reading = match self.store.get(bucket).await {
            Ok(Some(posture)) => PostureReading::from_posture(posture),
            Ok(None) => PostureReading::NotConfigured,
            Err(e) => PostureReading::ReadFailed(format!("{e:#}")),
        };

        match &reading {
            PostureReading::Secure(_) => info!(bucket, "all public access blocks are enabled"),
            PostureReading::Exposed(p) => warn!(
                bucket,
                block_public_acls = p.block_public_acls,
                ignore_public_acls = p.ignore_public_acls,
                block_public_policy = p.block_public_policy,
                restrict_public_buckets = p.restrict_public_buckets,
                "some public access blocks are disabled"
            ),
            PostureReading::NotConfigured => {
                warn!(bucket, "no public access block configuration; assuming public")
            }
            PostureReading::ReadFailed(reason) => {
                error!(
                    bucket,
                    store = self.store.name(),
                    %reason,
                    "could not read public access block; assuming public"
                )
            }
        }
        reading
    }

    pub async fn is_public(&self, bucket: &str) -> bool {
        self.read_posture(bucket).await.is_public()
    }

    /// Turns on all four switches. Safe to repeat.
    pub async fn remediate(&self, bucket: &str) -> Result<(), RemediationError> {
        info!(bucket, "enabling all public access blocks");
        match self.store.set(bucket, AccessPosture::locked()).await {
            Ok(()) => {
                info!(bucket, "blocked all public access");
                Ok(())
            }
            Err(source) => {
                let err = RemediationError { bucket: bucket.to_string(), source };
                error!(bucket, error = %err, "remediation failed");
                Err(err)
            }
        }
    }
}
