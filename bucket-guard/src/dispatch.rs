use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::clients::{AlertPublisher, PostureStore};
use crate::config::GuardConfig;
use crate::event::extract_bucket_name;
use crate::notify::Notifier;
use crate::posture::{PostureGuard, RemediationError};
use crate::types::{InvocationResult, RemediationOutcome};

pub const NO_BUCKET_MESSAGE: &str = "No bucket to check";

/// Where an invocation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Done(RemediationOutcome),
    /// Something outside the normal outcomes went wrong (a panic in the
    /// pipeline). Carries the captured message.
    SystemError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub bucket: Option<String>,
    pub disposition: Disposition,
    pub result: InvocationResult,
}

/// Runs one event through extract, check, remediate and notify.
pub struct Dispatcher {
    guard: PostureGuard,
    notifier: Notifier,
    settle_delay: Duration,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn PostureStore>,
        publisher: Arc<dyn AlertPublisher>,
        config: &GuardConfig,
    ) -> Self {
        Self {
            guard: PostureGuard::new(store),
            notifier: Notifier::new(publisher, config),
            settle_delay: config.settle_delay,
        }
    }

    pub async fn handle(&self, event: &Value) -> InvocationResult {
        self.dispatch(event).await.result
    }

    #[instrument(name = "invocation", skip_all, fields(bucket = tracing::field::Empty))]
    pub async fn dispatch(&self, event: &Value) -> Dispatched {
        info!("bucket guard activated");
        debug!(%event, "event received");

        let Some(bucket) = extract_bucket_name(event) else {
            return Dispatched {
                bucket: None,
                disposition: Disposition::Done(RemediationOutcome::NotApplicable),
                result: InvocationResult::ok(NO_BUCKET_MESSAGE),
            };
        };
        tracing::Span::current().record("bucket", bucket.as_str());
        info!(%bucket, "checking bucket");

        let run = AssertUnwindSafe(self.process(&bucket)).catch_unwind().await;
        let (disposition, result) = match run {
            Ok(Ok(RemediationOutcome::Remediated)) => (
                Disposition::Done(RemediationOutcome::Remediated),
                InvocationResult::ok(format!("Secured public bucket: {bucket}")),
            ),
            Ok(Ok(outcome)) => (
                Disposition::Done(outcome),
                InvocationResult::ok(format!("Bucket {bucket} is secure")),
            ),
            Ok(Err(e)) => {
                let msg = self.fail(&e.to_string()).await;
                (
                    Disposition::Done(RemediationOutcome::RemediationFailed),
                    InvocationResult::failed(msg),
                )
            }
            Err(payload) => {
                let cause = panic_message(payload.as_ref());
                let msg = self.fail(&cause).await;
                (Disposition::SystemError(cause), InvocationResult::failed(msg))
            }
        };

        Dispatched { bucket: Some(bucket), disposition, result }
    }

    async fn process(&self, bucket: &str) -> Result<RemediationOutcome, RemediationError> {
        if !self.settle_delay.is_zero() {
            debug!(delay = ?self.settle_delay, "waiting for bucket configuration to settle");
            tokio::time::sleep(self.settle_delay).await;
        }

        if !self.guard.is_public(bucket).await {
            info!(bucket, "bucket is already private; no action needed");
            self.notifier.notify_outcome(bucket, RemediationOutcome::AlreadySecure).await;
            return Ok(RemediationOutcome::AlreadySecure);
        }

        warn!(bucket, "bucket is PUBLIC");
        self.guard.remediate(bucket).await?;
        self.notifier.notify_outcome(bucket, RemediationOutcome::Remediated).await;
        Ok(RemediationOutcome::Remediated)
    }

    async fn fail(&self, cause: &str) -> String {
        let msg = format!("Error processing event: {cause}");
        error!(error = %msg, "invocation failed");
        self.notifier.notify_error(&msg).await;
        msg
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_messages() {
        let p: Box<dyn Any + Send> = Box::new("static text");
        assert_eq!(panic_message(p.as_ref()), "static text");
        let p: Box<dyn Any + Send> = Box::new(String::from("owned text"));
        assert_eq!(panic_message(p.as_ref()), "owned text");
        let p: Box<dyn Any + Send> = Box::new(17u8);
        assert_eq!(panic_message(p.as_ref()), "unknown panic");
    }
}
