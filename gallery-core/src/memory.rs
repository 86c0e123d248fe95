//! In-memory [`ObjectStore`], used by the test suites of both crates.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::store::{ObjectStore, ObjectSummary, StoredObject};

#[derive(Debug, Clone)]
struct Entry {
    data: Bytes,
    content_type: Option<String>,
    last_modified: DateTime<Utc>,
}

#[derive(Debug)]
struct State {
    bucket_exists: bool,
    failure: Option<String>,
    // insertion order stands in for the provider's listing order
    objects: Vec<(String, Entry)>,
}

#[derive(Debug)]
pub struct InMemoryStore {
    bucket: String,
    state: Mutex<State>,
    writes: AtomicUsize,
    calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            state: Mutex::new(State {
                bucket_exists: true,
                failure: None,
                objects: Vec::new(),
            }),
            writes: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// A store whose bucket has not been created yet.
    pub fn without_bucket(bucket: impl Into<String>) -> Self {
        let store = Self::new(bucket);
        store.lock().bucket_exists = false;
        store
    }

    /// Make every subsequent call fail with a provider error carrying `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.lock().failure = Some(message.into());
    }

    /// Seed an object directly, bypassing the write counter.
    pub fn insert(&self, key: &str, data: impl Into<Bytes>, content_type: Option<&str>) {
        let entry = Entry {
            data: data.into(),
            content_type: content_type.map(str::to_string),
            last_modified: Utc::now(),
        };
        let mut state = self.lock();
        match state.objects.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = entry,
            None => state.objects.push((key.to_string(), entry)),
        }
    }

    pub fn bucket_exists(&self) -> bool {
        self.lock().bucket_exists
    }

    /// Number of `put_object` calls received.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of storage calls of any kind received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().objects.iter().map(|(k, _)| k.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Common preamble: count the call and surface injected failures.
    fn enter(&self) -> Result<std::sync::MutexGuard<'_, State>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        if let Some(message) = &state.failure {
            return Err(StorageError::Provider(message.clone()));
        }
        Ok(state)
    }

    fn require_bucket(&self, state: &State) -> Result<(), StorageError> {
        if state.bucket_exists {
            Ok(())
        } else {
            Err(StorageError::Provider(format!(
                "NoSuchBucket: The specified bucket does not exist: {}",
                self.bucket
            )))
        }
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn head_bucket(&self) -> Result<(), StorageError> {
        let state = self.enter()?;
        if state.bucket_exists {
            Ok(())
        } else {
            Err(StorageError::BucketNotFound(self.bucket.clone()))
        }
    }

    async fn create_bucket(&self, _region: &str) -> Result<(), StorageError> {
        let mut state = self.enter()?;
        state.bucket_exists = true;
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut state = self.enter()?;
        self.require_bucket(&state)?;
        self.writes.fetch_add(1, Ordering::SeqCst);

        let entry = Entry {
            data,
            content_type: Some(content_type.to_string()),
            last_modified: Utc::now(),
        };
        match state.objects.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = entry,
            None => state.objects.push((key.to_string(), entry)),
        }
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<ObjectSummary>, StorageError> {
        let state = self.enter()?;
        self.require_bucket(&state)?;
        Ok(state
            .objects
            .iter()
            .map(|(key, entry)| ObjectSummary {
                key: key.clone(),
                size: entry.data.len() as u64,
                last_modified: entry.last_modified,
            })
            .collect())
    }

    async fn probe(&self) -> Result<(), StorageError> {
        let state = self.enter()?;
        self.require_bucket(&state)
    }

    async fn get_object(&self, key: &str) -> Result<StoredObject, StorageError> {
        let state = self.enter()?;
        self.require_bucket(&state)?;
        state
            .objects
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| StoredObject {
                data: entry.data.clone(),
                content_type: entry.content_type.clone(),
            })
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}
