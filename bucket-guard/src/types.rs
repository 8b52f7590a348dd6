use serde::{Deserialize, Serialize};

/// The four S3 public access block switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessPosture {
    pub block_public_acls: bool,
    pub ignore_public_acls: bool,
    pub block_public_policy: bool,
    pub restrict_public_buckets: bool,
}

impl AccessPosture {
    /// Every switch on. This is what remediation writes.
    pub fn locked() -> Self {
        Self {
            block_public_acls: true,
            ignore_public_acls: true,
            block_public_policy: true,
            restrict_public_buckets: true,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.block_public_acls
            && self.ignore_public_acls
            && self.block_public_policy
            && self.restrict_public_buckets
    }
}

/// Classified result of reading a bucket's posture.
///
/// Only `Secure` means the bucket is private; the other three all count as
/// public when deciding whether to remediate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostureReading {
    Secure(AccessPosture),
    Exposed(AccessPosture),
    NotConfigured,
    ReadFailed(String),
}

impl PostureReading {
    pub fn from_posture(posture: AccessPosture) -> Self {
        if posture.is_locked() {
            PostureReading::Secure(posture)
        } else {
            PostureReading::Exposed(posture)
        }
    }

    pub fn is_public(&self) -> bool {
        !matches!(self, PostureReading::Secure(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemediationOutcome {
    NotApplicable,
    AlreadySecure,
    Remediated,
    RemediationFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub severity: Severity,
}

/// What one invocation reports back to its host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResult {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status_code: 200, body: body.into() }
    }

    pub fn failed(body: impl Into<String>) -> Self {
        Self { status_code: 500, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_all_four_flags_count_as_secure() {
        assert!(!PostureReading::from_posture(AccessPosture::locked()).is_public());
        assert!(PostureReading::from_posture(AccessPosture::default()).is_public());

        for i in 0..4 {
            let mut p = AccessPosture::locked();
            match i {
                0 => p.block_public_acls = false,
                1 => p.ignore_public_acls = false,
                2 => p.block_public_policy = false,
                _ => p.restrict_public_buckets = false,
            }
            let reading = PostureReading::from_posture(p);
            assert_eq!(reading, PostureReading::Exposed(p));
            assert!(reading.is_public());
        }
    }

    #[test]
    fn unknown_readings_are_public() {
        assert!(PostureReading::NotConfigured.is_public());
        assert!(PostureReading::ReadFailed("AccessDenied".into()).is_public());
    }

    #[test]
    fn invocation_result_uses_host_field_names() {
        let v = serde_json::to_value(InvocationResult::failed("boom")).unwrap();
        assert_eq!(v, serde_json::json!({ "statusCode": 500, "body": "boom" }));
    }
}
