// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bounded FIFO task queue.
//!
//! At most `limit` tasks run at once; the rest wait in submission order. Halting drops every
//! task that has not started yet and lets running tasks finish. Running tasks that have side
//! effects are expected to check [`TaskQueue::is_halted`] before committing them.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_CONCURRENCY: usize = 5;

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Cheap to clone; clones share the same queue.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<Inner>,
}

struct Inner {
    limit: usize,
    state: Mutex<QueueState>,
    /// Tasks queued or running. Only written while `state` is locked.
    outstanding: watch::Sender<usize>,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Job>,
    in_flight: usize,
    halted: bool,
}

impl TaskQueue {
    /// `limit` is clamped to at least 1.
    pub fn new(limit: usize) -> Self {
        let (outstanding, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                limit: limit.max(1),
                state: Mutex::new(QueueState::default()),
                outstanding,
            }),
        }
    }

    pub fn limit(&self) -> usize {
        self.inner.limit
    }

    pub fn is_halted(&self) -> bool {
        self.inner.lock().halted
    }

    pub fn in_flight(&self) -> usize {
        self.inner.lock().in_flight
    }

    pub fn queued(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Submits `task`. It starts once fewer than `limit` tasks are running and every task
    /// submitted before it has started.
    ///
    /// Must be called from within a Tokio runtime. On a halted queue the task is dropped and the
    /// returned handle resolves to [`QueueError::Abandoned`].
    pub fn enqueue<F, T>(&self, task: F) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let _ = tx.send(task.await);
        });

        {
            let mut state = self.inner.lock();
            if state.halted {
                debug!("task queue is halted; dropping submitted task");
                return TaskHandle { rx };
            }
            state.pending.push_back(job);
            self.inner.outstanding.send_modify(|outstanding| *outstanding += 1);
        }

        self.inner.pump();
        TaskHandle { rx }
    }

    /// Stops dispatching. Queued tasks are dropped; running tasks finish.
    pub fn halt(&self) {
        let dropped: Vec<Job> = {
            let mut state = self.inner.lock();
            if state.halted {
                return;
            }
            state.halted = true;
            let dropped: Vec<Job> = state.pending.drain(..).collect();
            let count = dropped.len();
            self.inner.outstanding.send_modify(|outstanding| *outstanding -= count);
            dropped
        };
        debug!(dropped = dropped.len(), "task queue halted");
    }

    /// Resolves once no task is queued or running.
    ///
    /// Covers every task submitted before the call; tasks submitted while waiting extend the
    /// wait.
    pub async fn settled(&self) {
        let mut outstanding = self.inner.outstanding.subscribe();
        let _ = outstanding.wait_for(|outstanding| *outstanding == 0).await;
    }

    /// Runs `callback` on a spawned task once the queue has settled.
    pub fn on_settled<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let queue = self.clone();
        tokio::spawn(async move {
            queue.settled().await;
            callback();
        })
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("TaskQueue")
            .field("limit", &self.inner.limit)
            .field("queued", &state.pending.len())
            .field("in_flight", &state.in_flight)
            .field("halted", &state.halted)
            .finish()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Counters stay consistent across a panicking task, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn pump(self: &Arc<Self>) {
        let ready: Vec<Job> = {
            let mut state = self.lock();
            let mut ready = Vec::new();
            while !state.halted && state.in_flight < self.limit {
                let Some(job) = state.pending.pop_front() else {
                    break;
                };
                state.in_flight += 1;
                ready.push(job);
            }
            ready
        };

        for job in ready {
            let slot = Slot { inner: self.clone() };
            tokio::spawn(async move {
                let _slot = slot;
                job.await;
            });
        }
    }
}

/// Releases one in-flight slot when the running task ends, including by panic.
struct Slot {
    inner: Arc<Inner>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        {
            let mut state = self.inner.lock();
            state.in_flight -= 1;
            self.inner.outstanding.send_modify(|outstanding| *outstanding -= 1);
        }
        if tokio::runtime::Handle::try_current().is_ok() {
            self.inner.pump();
        }
    }
}

/// Result side of a submitted task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    pub async fn join(self) -> Result<T, QueueError> {
        self.rx.await.map_err(|_| QueueError::Abandoned)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The task was dropped without producing a value: the queue halted before it started, or
    /// it panicked.
    Abandoned,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abandoned => f.write_str("task was abandoned before completing"),
        }
    }
}

impl std::error::Error for QueueError {}
