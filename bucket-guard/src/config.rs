use std::time::Duration;

use thiserror::Error;
use tracing::warn;

pub const PLACEHOLDER_TOPIC_ARN: &str = "arn:aws:sns:us-east-1:YOUR-ACCOUNT-ID:MyFirstAlert";
pub const DEFAULT_LOG_GROUP: &str = "/aws/lambda/GhostProtocol-S3-Monitor";
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got '{value}'")]
    NotANumber { key: &'static str, value: String },
    #[error("{key} must be at least 1")]
    Zero { key: &'static str },
}

/// Process-wide settings, read once at startup and handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// SNS topic every alert goes to.
    pub topic_arn: String,
    /// Wait between receiving an event and reading the bucket's posture.
    pub settle_delay: Duration,
    /// Where operators should look for logs; quoted in error alerts.
    pub log_group: String,
    /// Attempt budget handed to the AWS SDK retry layer.
    pub max_attempts: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            topic_arn: PLACEHOLDER_TOPIC_ARN.to_string(),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            log_group: DEFAULT_LOG_GROUP.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl GuardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let topic_arn = env_or(&lookup, "SNS_TOPIC_ARN", PLACEHOLDER_TOPIC_ARN);
        let log_group = non_blank(&lookup, "GUARD_LOG_GROUP")
            .or_else(|| non_blank(&lookup, "AWS_LAMBDA_LOG_GROUP_NAME"))
            .unwrap_or_else(|| DEFAULT_LOG_GROUP.to_string());

        let settle_ms = parse_u64(&lookup, "GUARD_SETTLE_DELAY_MS", DEFAULT_SETTLE_DELAY_MS)?;
        let max_attempts = parse_u64(&lookup, "GUARD_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS as u64)?;
        if max_attempts == 0 {
            return Err(ConfigError::Zero { key: "GUARD_MAX_ATTEMPTS" });
        }
        let max_attempts = u32::try_from(max_attempts).map_err(|_| ConfigError::NotANumber {
            key: "GUARD_MAX_ATTEMPTS",
            value: max_attempts.to_string(),
        })?;

        Ok(Self {
            topic_arn,
            settle_delay: Duration::from_millis(settle_ms),
            log_group,
            max_attempts,
        })
    }

    pub fn uses_placeholder_topic(&self) -> bool {
        self.topic_arn == PLACEHOLDER_TOPIC_ARN
    }

    /// Logs a warning if the alert topic was never configured.
    pub fn warn_if_placeholder(&self) {
        if self.uses_placeholder_topic() {
            warn!(
                topic_arn = %self.topic_arn,
                "SNS_TOPIC_ARN is not set; alerts go to the placeholder topic"
            );
        }
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|s| !s.trim().is_empty())
}

fn env_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_blank(lookup, key).unwrap_or_else(|| default.to_string())
}

fn parse_u64<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::NotANumber { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = GuardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, GuardConfig::default());
        assert!(cfg.uses_placeholder_topic());
        assert_eq!(cfg.settle_delay, Duration::from_secs(2));
    }

    #[test]
    fn reads_overrides() {
        let cfg = GuardConfig::from_lookup(lookup(&[
            ("SNS_TOPIC_ARN", "arn:aws:sns:eu-west-1:111122223333:sec-alerts"),
            ("GUARD_SETTLE_DELAY_MS", "0"),
            ("AWS_LAMBDA_LOG_GROUP_NAME", "/aws/lambda/bucket-guard"),
            ("GUARD_MAX_ATTEMPTS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.topic_arn, "arn:aws:sns:eu-west-1:111122223333:sec-alerts");
        assert_eq!(cfg.settle_delay, Duration::ZERO);
        assert_eq!(cfg.log_group, "/aws/lambda/bucket-guard");
        assert_eq!(cfg.max_attempts, 5);
        assert!(!cfg.uses_placeholder_topic());
    }

    #[test]
    fn explicit_log_group_wins_over_lambda_default() {
        let cfg = GuardConfig::from_lookup(lookup(&[
            ("GUARD_LOG_GROUP", "/custom/group"),
            ("AWS_LAMBDA_LOG_GROUP_NAME", "/aws/lambda/bucket-guard"),
        ]))
        .unwrap();
        assert_eq!(cfg.log_group, "/custom/group");
    }

    #[test]
    fn blank_log_group_falls_back_to_lambda_default() {
        let cfg = GuardConfig::from_lookup(lookup(&[
            ("GUARD_LOG_GROUP", "  "),
            ("AWS_LAMBDA_LOG_GROUP_NAME", "/aws/lambda/bucket-guard"),
        ]))
        .unwrap();
        assert_eq!(cfg.log_group, "/aws/lambda/bucket-guard");

        let cfg = GuardConfig::from_lookup(lookup(&[("GUARD_LOG_GROUP", "")])).unwrap();
        assert_eq!(cfg.log_group, DEFAULT_LOG_GROUP);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err =
            GuardConfig::from_lookup(lookup(&[("GUARD_SETTLE_DELAY_MS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::NotANumber { key: "GUARD_SETTLE_DELAY_MS", .. }));

        let err = GuardConfig::from_lookup(lookup(&[("GUARD_MAX_ATTEMPTS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Zero { .. }));
    }
}
