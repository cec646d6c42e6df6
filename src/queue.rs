//! Bounded FIFO of work items between the poller and the executor pool.

use std::collections::VecDeque;

use thiserror::Error;
use tokio::sync::{Mutex, Notify};

use crate::job::Job;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Error, Debug)]
pub enum PushError {
    /// Queue at capacity; the rejected job is handed back to the producer.
    #[error("job queue is full")]
    Full(Job),

    /// Queue closed; no new work is accepted.
    #[error("job queue is closed")]
    Closed(Job),
}

struct QueueState {
    items: VecDeque<Job>,
    closed: bool,
}

/// Multi-producer / multi-consumer job queue.
///
/// Jobs move through by ownership: `try_push` takes the job, `pop` hands it
/// to exactly one consumer. After [`close`](Self::close), remaining items
/// drain in FIFO order and then every `pop` returns `None`.
pub struct JobQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl JobQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
            capacity,
        }
    }

    /// Append a job, waking one waiter. Non-blocking: a full queue rejects
    /// the job so the producer sees backpressure instead of stalling.
    pub async fn try_push(&self, job: Job) -> Result<(), PushError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(PushError::Closed(job));
        }
        if state.items.len() >= self.capacity {
            return Err(PushError::Full(job));
        }
        state.items.push_back(job);
        self.notify.notify_one();
        Ok(())
    }

    /// Take the next job, waiting until one is available. Returns `None`
    /// once the queue is closed and drained.
    pub async fn pop(&self) -> Option<Job> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().await;
                if let Some(job) = state.items.pop_front() {
                    if !state.items.is_empty() {
                        self.notify.notify_one();
                    }
                    return Some(job);
                }
                if state.closed {
                    // Cascade the wakeup so every blocked consumer unblocks.
                    self.notify.notify_one();
                    return None;
                }
            }
            notified.await;
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.items.is_empty()
    }

    /// Stop accepting work and wake all waiters. Idempotent.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.closed = true;
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}
