//! In-memory stand-ins for S3 and SNS, used by `--mock` runs and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::info;

use crate::clients::{AlertPublisher, PostureStore};
use crate::types::AccessPosture;

#[derive(Default)]
pub struct InMemoryPostureStore {
    buckets: Mutex<HashMap<String, AccessPosture>>,
    read_failure: Mutex<Option<String>>,
    write_failure: Mutex<Option<String>>,
    panic_on_read: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryPostureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding one locked bucket; everything else is unconfigured.
    pub fn demo() -> Self {
        let s = Self::new();
        s.insert("demo-locked-bucket", AccessPosture::locked());
        s
    }

    pub fn insert(&self, bucket: &str, posture: AccessPosture) {
        lock(&self.buckets).insert(bucket.to_string(), posture);
    }

    pub fn posture(&self, bucket: &str) -> Option<AccessPosture> {
        lock(&self.buckets).get(bucket).copied()
    }

    pub fn fail_reads(&self, reason: &str) {
        *lock(&self.read_failure) = Some(reason.to_string());
    }

    pub fn fail_writes(&self, reason: &str) {
        *lock(&self.write_failure) = Some(reason.to_string());
    }

    pub fn panic_on_read(&self) {
        self.panic_on_read.store(true, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostureStore for InMemoryPostureStore {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn get(&self, bucket: &str) -> Result<Option<AccessPosture>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_read.load(Ordering::SeqCst) {
            panic!("posture store blew up reading {bucket}");
        }
        if let Some(reason) = lock(&self.read_failure).clone() {
            return Err(anyhow!(reason));
        }
        Ok(self.posture(bucket))
    }

    async fn set(&self, bucket: &str, posture: AccessPosture) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = lock(&self.write_failure).clone() {
            return Err(anyhow!(reason));
        }
        self.insert(bucket, posture);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub destination: String,
    pub subject: String,
    pub body: String,
}

/// Keeps every published message instead of sending it.
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<Published>>,
    failure: Mutex<Option<String>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, reason: &str) {
        *lock(&self.failure) = Some(reason.to_string());
    }

    pub fn sent(&self) -> Vec<Published> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl AlertPublisher for RecordingPublisher {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn publish(&self, destination: &str, subject: &str, body: &str) -> Result<String> {
        if let Some(reason) = lock(&self.failure).clone() {
            return Err(anyhow!(reason));
        }
        let mut sent = lock(&self.sent);
        sent.push(Published {
            destination: destination.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        let id = format!("mock-{}", sent.len());
        info!(message_id = %id, %subject, "recorded alert");
        Ok(id)
    }
}

// A panic while holding one of these locks must not wedge later calls.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
