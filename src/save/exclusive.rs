// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;
use tracing::{debug, warn};

pub type CycleFuture<E> = Pin<Box<dyn Future<Output = Result<(), E>> + Send>>;

/// Identity of a cycle. Two pending cycles with the same id are the same cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleId(&'static str);

impl CycleId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A restartable unit of work run under a scope's exclusion.
pub struct Cycle<E> {
    id: CycleId,
    run: Arc<dyn Fn() -> CycleFuture<E> + Send + Sync>,
}

impl<E> Cycle<E> {
    pub fn new<F, Fut>(id: CycleId, run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        Self { id, run: Arc::new(move || Box::pin(run()) as CycleFuture<E>) }
    }

    pub fn id(&self) -> CycleId {
        self.id
    }

    fn start(&self) -> CycleFuture<E> {
        (self.run)()
    }
}

impl<E> Clone for Cycle<E> {
    fn clone(&self) -> Self {
        Self { id: self.id, run: self.run.clone() }
    }
}

impl<E> fmt::Debug for Cycle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cycle").field("id", &self.id).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusiveOutcome {
    /// The cycle ran to completion on the caller's task.
    Completed,
    /// Another cycle held the scope; this one will run after it.
    Queued,
}

struct ProcessingState<E> {
    in_progress: bool,
    pending: VecDeque<Cycle<E>>,
}

impl<E> Default for ProcessingState<E> {
    fn default() -> Self {
        Self { in_progress: false, pending: VecDeque::new() }
    }
}

/// Per-scope mutual exclusion for save/creation cycles.
///
/// While a scope is busy, new cycles are parked (deduplicated by [`CycleId`]). When the running
/// cycle ends, successfully or not, the first parked cycle takes over the scope and runs on a
/// spawned task; the rest stay parked until it ends in turn.
pub struct ExclusiveRunner<K, E> {
    scopes: Mutex<HashMap<K, ProcessingState<E>>>,
    idle: Notify,
}

impl<K, E> ExclusiveRunner<K, E>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    E: fmt::Display + Send + 'static,
{
    pub fn new() -> Arc<Self> {
        Arc::new(Self { scopes: Mutex::new(HashMap::new()), idle: Notify::new() })
    }

    pub fn is_processing(&self, scope: &K) -> bool {
        self.lock().get(scope).is_some_and(|state| state.in_progress)
    }

    pub fn pending(&self, scope: &K) -> Vec<CycleId> {
        self.lock()
            .get(scope)
            .map(|state| state.pending.iter().map(Cycle::id).collect())
            .unwrap_or_default()
    }

    /// Runs `cycle` now if `scope` is free, otherwise parks it and returns
    /// [`ExclusiveOutcome::Queued`] without waiting.
    ///
    /// Errors from a cycle run on the caller's task are returned to the caller; errors from a
    /// parked cycle are logged. Either way the scope is released.
    pub async fn run_exclusive(
        self: &Arc<Self>,
        scope: K,
        cycle: Cycle<E>,
    ) -> Result<ExclusiveOutcome, E> {
        {
            let mut scopes = self.lock();
            let state = scopes.entry(scope.clone()).or_default();
            if state.in_progress {
                if state.pending.iter().any(|parked| parked.id == cycle.id) {
                    debug!(?scope, cycle = %cycle.id, "cycle already pending; coalesced");
                } else {
                    debug!(?scope, cycle = %cycle.id, "scope busy; cycle queued");
                    state.pending.push_back(cycle);
                }
                return Ok(ExclusiveOutcome::Queued);
            }
            state.in_progress = true;
        }

        let _guard = ScopeGuard { runner: self.clone(), scope };
        cycle.start().await.map(|()| ExclusiveOutcome::Completed)
    }

    /// Resolves once `scope` is neither running nor holding parked cycles.
    pub async fn wait_idle(&self, scope: &K) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let busy = self
                .lock()
                .get(scope)
                .is_some_and(|state| state.in_progress || !state.pending.is_empty());
            if !busy {
                return;
            }
            notified.await;
        }
    }

    /// Drops the state of an idle scope. Returns false while the scope is busy.
    pub fn forget(&self, scope: &K) -> bool {
        let mut scopes = self.lock();
        match scopes.get(scope) {
            Some(state) if state.in_progress || !state.pending.is_empty() => false,
            _ => {
                scopes.remove(scope);
                true
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, ProcessingState<E>>> {
        self.scopes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Releases `scope`, handing it straight to the next parked cycle if there is one.
    fn finish(self: &Arc<Self>, scope: K) {
        let next = {
            let mut scopes = self.lock();
            let state = scopes.entry(scope.clone()).or_default();
            state.in_progress = false;
            let next = state.pending.pop_front();
            if next.is_some() {
                state.in_progress = true;
            }
            next
        };

        let Some(next) = next else {
            self.idle.notify_waiters();
            return;
        };

        if tokio::runtime::Handle::try_current().is_err() {
            warn!(?scope, cycle = %next.id, "no runtime to run pending cycle; dropping it");
            self.lock().entry(scope).or_default().in_progress = false;
            self.idle.notify_waiters();
            return;
        }

        debug!(?scope, cycle = %next.id, "starting pending cycle");
        let runner = self.clone();
        tokio::spawn(async move {
            let _guard = ScopeGuard { runner, scope: scope.clone() };
            if let Err(err) = next.start().await {
                warn!(?scope, cycle = %next.id, "pending cycle failed: {err}");
            }
        });
    }
}

/// Calls [`ExclusiveRunner::finish`] when the running cycle ends, including when its future
/// is dropped midway.
struct ScopeGuard<K, E>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    E: fmt::Display + Send + 'static,
{
    runner: Arc<ExclusiveRunner<K, E>>,
    scope: K,
}

impl<K, E> Drop for ScopeGuard<K, E>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    E: fmt::Display + Send + 'static,
{
    fn drop(&mut self) {
        self.runner.finish(self.scope.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::sync::oneshot;

    use super::{Cycle, CycleId, ExclusiveOutcome, ExclusiveRunner};

    const SAVE: CycleId = CycleId::new("save");
    const CREATE: CycleId = CycleId::new("create");

    type Runner = ExclusiveRunner<u64, String>;

    fn recording_cycle(id: CycleId, log: Arc<Mutex<Vec<String>>>) -> Cycle<String> {
        let running = Arc::new(AtomicUsize::new(0));
        Cycle::new(id, move || {
            let log = log.clone();
            let running = running.clone();
            async move {
                assert_eq!(running.fetch_add(1, Ordering::SeqCst), 0);
                log.lock().unwrap().push(format!("start {}", id));
                tokio::task::yield_now().await;
                log.lock().unwrap().push(format!("end {}", id));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    fn gated_cycle(id: CycleId, gate: oneshot::Receiver<()>) -> Cycle<String> {
        let gate = Arc::new(Mutex::new(Some(gate)));
        Cycle::new(id, move || {
            let gate = gate.lock().unwrap().take();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn free_scope_runs_cycle_immediately() {
        let runner = Runner::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let outcome = runner.run_exclusive(1, recording_cycle(SAVE, log.clone())).await;
        assert_eq!(outcome, Ok(ExclusiveOutcome::Completed));
        assert!(!runner.is_processing(&1));
        assert_eq!(*log.lock().unwrap(), ["start save", "end save"]);
    }

    #[tokio::test]
    async fn busy_scope_queues_and_coalesces_then_runs_one_at_a_time() {
        let runner = Runner::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let (release, gate) = oneshot::channel();

        let first = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run_exclusive(1, gated_cycle(CREATE, gate)).await }
        });
        tokio::task::yield_now().await;
        assert!(runner.is_processing(&1));

        for _ in 0..3 {
            let outcome = runner.run_exclusive(1, recording_cycle(SAVE, log.clone())).await;
            assert_eq!(outcome, Ok(ExclusiveOutcome::Queued));
        }
        let outcome = runner.run_exclusive(1, recording_cycle(CREATE, log.clone())).await;
        assert_eq!(outcome, Ok(ExclusiveOutcome::Queued));
        assert_eq!(runner.pending(&1), [SAVE, CREATE]);

        release.send(()).unwrap();
        assert_eq!(first.await.unwrap(), Ok(ExclusiveOutcome::Completed));
        runner.wait_idle(&1).await;

        assert_eq!(*log.lock().unwrap(), ["start save", "end save", "start create", "end create"]);
        assert!(runner.pending(&1).is_empty());
    }

    #[tokio::test]
    async fn failing_cycle_releases_scope_and_still_drains_the_next() {
        let runner = Runner::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let (release, gate) = oneshot::channel();

        let held = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run_exclusive(1, gated_cycle(SAVE, gate)).await }
        });
        tokio::task::yield_now().await;

        let failing = Cycle::new(CREATE, || async { Err::<(), _>("transport down".to_owned()) });
        assert_eq!(runner.run_exclusive(1, failing).await, Ok(ExclusiveOutcome::Queued));
        let outcome = runner.run_exclusive(1, recording_cycle(SAVE, log.clone())).await;
        assert_eq!(outcome, Ok(ExclusiveOutcome::Queued));

        release.send(()).unwrap();
        assert_eq!(held.await.unwrap(), Ok(ExclusiveOutcome::Completed));
        runner.wait_idle(&1).await;

        assert_eq!(*log.lock().unwrap(), ["start save", "end save"]);
        assert!(!runner.is_processing(&1));
    }

    #[tokio::test]
    async fn error_is_returned_to_the_direct_caller() {
        let runner = Runner::new();
        let cycle = Cycle::new(SAVE, || async { Err::<(), _>("nope".to_owned()) });
        assert_eq!(runner.run_exclusive(7, cycle).await, Err("nope".to_owned()));
        assert!(!runner.is_processing(&7));

        let log = Arc::new(Mutex::new(Vec::new()));
        let outcome = runner.run_exclusive(7, recording_cycle(SAVE, log)).await;
        assert_eq!(outcome, Ok(ExclusiveOutcome::Completed));
    }

    #[tokio::test]
    async fn scopes_do_not_block_each_other() {
        let runner = Runner::new();
        let (_release, gate) = oneshot::channel();
        let _busy = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run_exclusive(1, gated_cycle(SAVE, gate)).await }
        });
        tokio::task::yield_now().await;
        assert!(runner.is_processing(&1));

        let log = Arc::new(Mutex::new(Vec::new()));
        let outcome = runner.run_exclusive(2, recording_cycle(SAVE, log)).await;
        assert_eq!(outcome, Ok(ExclusiveOutcome::Completed));
        assert!(!runner.forget(&1));
        assert!(runner.forget(&2));
    }

    #[tokio::test]
    async fn dropping_the_caller_future_releases_the_scope() {
        let runner = Runner::new();
        let (_release, gate) = oneshot::channel();
        let busy = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run_exclusive(1, gated_cycle(SAVE, gate)).await }
        });
        tokio::task::yield_now().await;
        assert!(runner.is_processing(&1));

        busy.abort();
        let _ = busy.await;
        assert!(!runner.is_processing(&1));
    }
}
