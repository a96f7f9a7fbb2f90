//! FIFO queue store abstraction.
//!
//! Entries are appended at the tail and popped from the head. Both operations
//! are atomic at the store level, so concurrent workers never receive the same
//! entry twice.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("queue store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Appends to the tail and returns the new queue length.
    async fn append(&self, key: &str, value: &str) -> Result<u64, QueueError>;

    /// Removes and returns the head entry, or `None` when the queue is empty.
    async fn pop_front(&self, key: &str) -> Result<Option<String>, QueueError>;

    async fn len(&self, key: &str) -> Result<u64, QueueError>;

    async fn ping(&self) -> Result<(), QueueError>;
}

/// In-process queue store. Used where no Redis instance is available.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    lists: Mutex<HashMap<String, VecDeque<String>>>,
    unavailable: AtomicBool,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of the list stored under `key`, head first.
    pub fn entries(&self, key: &str) -> Vec<String> {
        self.lists
            .lock()
            .map(|lists| {
                lists
                    .get(key)
                    .map(|list| list.iter().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    fn with_lists<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, VecDeque<String>>) -> T,
    ) -> Result<T, QueueError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(QueueError::Unavailable("memory queue switched off".to_string()));
        }

        let mut lists = self
            .lists
            .lock()
            .map_err(|_| QueueError::Unavailable("memory queue lock poisoned".to_string()))?;

        Ok(f(&mut lists))
    }
}

#[async_trait]
impl QueueStore for MemoryQueue {
    async fn append(&self, key: &str, value: &str) -> Result<u64, QueueError> {
        self.with_lists(|lists| {
            let list = lists.entry(key.to_string()).or_default();
            list.push_back(value.to_string());
            list.len() as u64
        })
    }

    async fn pop_front(&self, key: &str) -> Result<Option<String>, QueueError> {
        self.with_lists(|lists| {
            let list = lists.get_mut(key)?;
            let head = list.pop_front();
            if list.is_empty() {
                lists.remove(key);
            }
            head
        })
    }

    async fn len(&self, key: &str) -> Result<u64, QueueError> {
        self.with_lists(|lists| lists.get(key).map_or(0, |list| list.len() as u64))
    }

    async fn ping(&self) -> Result<(), QueueError> {
        self.with_lists(|_| ())
    }
}
