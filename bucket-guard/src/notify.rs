use std::sync::Arc;

use tracing::{debug, error, info};

use crate::clients::AlertPublisher;
use crate::config::GuardConfig;
use crate::types::{Notification, RemediationOutcome, Severity};

pub const FIXED_SUBJECT: &str = "Bucket Guard: Public S3 Bucket FIXED";
pub const ERROR_SUBJECT: &str = "Bucket Guard: System Error";

const RULE: &str = "--------------------------------";

/// Formats outcome alerts and sends them to the configured topic.
///
/// Delivery is best-effort: a failed publish is logged and dropped.
pub struct Notifier {
    publisher: Arc<dyn AlertPublisher>,
    topic_arn: String,
    log_group: String,
}

impl Notifier {
    pub fn new(publisher: Arc<dyn AlertPublisher>, config: &GuardConfig) -> Self {
        Self {
            publisher,
            topic_arn: config.topic_arn.clone(),
            log_group: config.log_group.clone(),
        }
    }

    pub async fn notify_outcome(&self, bucket: &str, outcome: RemediationOutcome) {
        match outcome_message(bucket, outcome) {
            Some(n) => self.send(n).await,
            None => debug!(bucket, ?outcome, "no alert for this outcome"),
        }
    }

    pub async fn notify_error(&self, message: &str) {
        self.send(error_message(message, &self.log_group)).await;
    }

    async fn send(&self, n: Notification) {
        match self.publisher.publish(&self.topic_arn, &n.subject, &n.body).await {
            Ok(message_id) => info!(
                %message_id,
                subject = %n.subject,
                severity = n.severity.as_str(),
                "alert sent"
            ),
            Err(e) => error!(
                publisher = self.publisher.name(),
                topic_arn = %self.topic_arn,
                subject = %n.subject,
                error = %format!("{e:#}"),
                "failed to send alert"
            ),
        }
    }
}

/// The alert for a finished remediation, if that outcome gets one.
///
/// Already-secure buckets deliberately produce nothing. Failures go through
/// `error_message` instead.
pub fn outcome_message(bucket: &str, outcome: RemediationOutcome) -> Option<Notification> {
    match outcome {
        RemediationOutcome::Remediated => Some(fixed_message(bucket)),
        RemediationOutcome::AlreadySecure
        | RemediationOutcome::NotApplicable
        | RemediationOutcome::RemediationFailed => None,
    }
}

fn fixed_message(bucket: &str) -> Notification {
    let severity = Severity::High;
    let body = format!(
        "BUCKET GUARD SECURITY ALERT\n\
         \n\
         VIOLATION DETECTED AND FIXED\n\
         \n\
         Bucket Details:\n\
         {RULE}\n\
         - Bucket Name: {bucket}\n\
         - Issue: Bucket was created WITHOUT public access protection\n\
         - Severity: {severity}\n\
         - Status: REMEDIATED\n\
         \n\
         Actions Taken:\n\
         {RULE}\n\
         - All public access has been BLOCKED\n\
         - Bucket is now SECURE\n\
         - No data exposure is assumed\n\
         \n\
         This bucket is now protected by:\n\
         - BlockPublicAcls: ON\n\
         - IgnorePublicAcls: ON\n\
         - BlockPublicPolicy: ON\n\
         - RestrictPublicBuckets: ON\n\
         \n\
         {RULE}\n\
         Automated by Bucket Guard\n",
        severity = severity.as_str(),
    );
    Notification { subject: FIXED_SUBJECT.to_string(), body, severity }
}

pub fn error_message(message: &str, log_group: &str) -> Notification {
    let body = format!(
        "BUCKET GUARD ERROR ALERT\n\
         \n\
         An error occurred in the Bucket Guard security system:\n\
         \n\
         Error Details:\n\
         {message}\n\
         \n\
         Please check CloudWatch Logs for more information:\n\
         Log Group: {log_group}\n\
         \n\
         {RULE}\n\
         This requires manual investigation.\n"
    );
    Notification {
        subject: ERROR_SUBJECT.to_string(),
        body,
        severity: Severity::Critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingPublisher;

    fn notifier(publisher: &Arc<RecordingPublisher>) -> Notifier {
        let cfg = GuardConfig {
            topic_arn: "arn:aws:sns:us-east-1:111122223333:alerts".into(),
            log_group: "/aws/lambda/bucket-guard".into(),
            ..GuardConfig::default()
        };
        Notifier::new(publisher.clone(), &cfg)
    }

    #[test]
    fn fixed_message_lists_the_violation() {
        let n = outcome_message("acme-logs", RemediationOutcome::Remediated).unwrap();
        assert!(n.subject.contains("FIXED"));
        assert_eq!(n.severity, Severity::High);
        assert!(n.body.contains("Bucket Name: acme-logs"));
        assert!(n.body.contains("WITHOUT public access protection"));
        for flag in [
            "BlockPublicAcls",
            "IgnorePublicAcls",
            "BlockPublicPolicy",
            "RestrictPublicBuckets",
        ] {
            assert!(n.body.contains(&format!("{flag}: ON")), "missing {flag}");
        }
    }

    #[test]
    fn quiet_outcomes() {
        for o in [
            RemediationOutcome::AlreadySecure,
            RemediationOutcome::NotApplicable,
            RemediationOutcome::RemediationFailed,
        ] {
            assert_eq!(outcome_message("b", o), None);
        }
    }

    #[tokio::test]
    async fn sends_to_configured_topic() {
        let publisher = Arc::new(RecordingPublisher::new());
        notifier(&publisher).notify_outcome("acme-logs", RemediationOutcome::Remediated).await;

        let sent = publisher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].destination, "arn:aws:sns:us-east-1:111122223333:alerts");
        assert_eq!(sent[0].subject, FIXED_SUBJECT);
    }

    #[tokio::test]
    async fn already_secure_sends_nothing() {
        let publisher = Arc::new(RecordingPublisher::new());
        notifier(&publisher).notify_outcome("acme-data", RemediationOutcome::AlreadySecure).await;
        assert!(publisher.sent().is_empty());
    }

    #[tokio::test]
    async fn error_alert_points_at_logs() {
        let publisher = Arc::new(RecordingPublisher::new());
        notifier(&publisher).notify_error("failed to remediate acme-logs: AccessDenied").await;

        let sent = publisher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, ERROR_SUBJECT);
        assert!(sent[0].body.contains("failed to remediate acme-logs: AccessDenied"));
        assert!(sent[0].body.contains("Log Group: /aws/lambda/bucket-guard"));
    }

    #[tokio::test]
    async fn publish_failures_are_swallowed() {
        let publisher = Arc::new(RecordingPublisher::new());
        publisher.fail_with("topic does not exist");
        let n = notifier(&publisher);
        n.notify_outcome("acme-logs", RemediationOutcome::Remediated).await;
        n.notify_error("boom").await;
        assert!(publisher.sent().is_empty());
    }
}
