use serde_json::Value;
use tracing::{debug, warn};

const BUCKET_KEY: &str = "bucketName";

/// Pulls the bucket name out of an EventBridge/CloudTrail S3 event.
///
/// Looks in `detail.requestParameters`, then `detail.responseElements`, then
/// re-checks the request parameters for `CreateBucket`. Anything missing or
/// shaped wrong just yields `None`.
pub fn extract_bucket_name(event: &Value) -> Option<String> {
    let detail = event.get("detail");
    let event_name = detail
        .and_then(|d| d.get("eventName"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !event_name.is_empty() {
        debug!(event_name, "inspecting event");
    }

    let request = detail.and_then(|d| d.get("requestParameters"));
    let response = detail.and_then(|d| d.get("responseElements"));

    let found = bucket_in(request)
        .or_else(|| bucket_in(response))
        .or_else(|| {
            if event_name == "CreateBucket" {
                bucket_in(request)
            } else {
                None
            }
        });

    if found.is_none() {
        warn!(event_name, "could not find bucket name in event structure");
    }
    found
}

// Non-string or blank values count as absent; anything else is returned verbatim.
fn bucket_in(section: Option<&Value>) -> Option<String> {
    section?
        .as_object()?
        .get(BUCKET_KEY)?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
