// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tree diff and record materialization.
//!
//! Every edit yields a new tree snapshot. Nodes that appear in it for the first time and have no
//! record yet get one created through the bounded creation queue, exactly once per node.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::model::{LocalId, MenuQuery, Node, PlaceholderItem, RecordId};
use crate::queue::{TaskHandle, TaskQueue};
use crate::store::{ApiError, EditorStore, MenuItemsApi};
use crate::tree::{local_ids, walk_tree, Visit};

pub type CreationResult = Result<RecordId, ApiError>;

/// A creation submitted by [`Materializer::reconcile`].
#[derive(Debug)]
pub struct ScheduledCreation {
    pub local_id: LocalId,
    pub handle: TaskHandle<CreationResult>,
}

/// Nodes of `next` absent from `previous`, in pre-order. `None` stands for an empty tree.
pub fn diff_new_nodes<'a>(previous: Option<&Node>, next: &'a Node) -> Vec<Visit<'a>> {
    let known = previous.map(local_ids).unwrap_or_default();
    walk_tree(next)
        .into_iter()
        .filter(|visit| !known.contains(visit.node.local_id()))
        .collect()
}

type Requested = Arc<Mutex<HashSet<LocalId>>>;

#[derive(Clone)]
struct Generation {
    queue: TaskQueue,
    requested: Requested,
}

impl Generation {
    fn new(limit: usize) -> Self {
        Self { queue: TaskQueue::new(limit), requested: Arc::default() }
    }
}

/// Creates backing records for new nodes of one menu.
///
/// Owns the menu's creation queue and its "already requested" set. [`Materializer::reset`]
/// halts both and starts a fresh pair, so creations still pending for an abandoned tree never
/// touch the mapping of the next one.
pub struct Materializer {
    query: MenuQuery,
    api: Arc<dyn MenuItemsApi>,
    store: Arc<EditorStore>,
    placeholder: PlaceholderItem,
    limit: usize,
    generation: Mutex<Generation>,
}

impl Materializer {
    pub fn new(
        query: MenuQuery,
        api: Arc<dyn MenuItemsApi>,
        store: Arc<EditorStore>,
        placeholder: PlaceholderItem,
        limit: usize,
    ) -> Self {
        Self {
            query,
            api,
            store,
            placeholder,
            limit,
            generation: Mutex::new(Generation::new(limit)),
        }
    }

    pub fn query(&self) -> MenuQuery {
        self.query
    }

    /// Schedules a create call for every node of `next` that is new relative to `previous`,
    /// has no mapped record and was not requested already. Does not wait for the calls.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn reconcile(&self, previous: Option<&Node>, next: &Node) -> Vec<ScheduledCreation> {
        let generation = self.generation();
        let mut scheduled = Vec::new();

        for visit in diff_new_nodes(previous, next) {
            let local_id = visit.node.local_id();
            if self.store.record_id_for(&self.query, local_id).is_some() {
                continue;
            }
            if !lock_requested(&generation.requested).insert(local_id.clone()) {
                continue;
            }

            debug!(query = %self.query, %local_id, label = visit.node.label(), "scheduling creation");
            let handle = generation.queue.enqueue(self.creation_task(&generation, local_id.clone()));
            scheduled.push(ScheduledCreation { local_id: local_id.clone(), handle });
        }

        scheduled
    }

    /// Halts the current queue and starts a new generation with an empty request set.
    pub fn reset(&self) {
        let mut generation = self.generation.lock().unwrap_or_else(|p| p.into_inner());
        generation.queue.halt();
        *generation = Generation::new(self.limit);
        debug!(query = %self.query, "creation queue reset");
    }

    /// Stops dispatching without starting a new generation.
    pub fn halt(&self) {
        self.generation().queue.halt();
    }

    pub fn is_requested(&self, local_id: &LocalId) -> bool {
        lock_requested(&self.generation().requested).contains(local_id)
    }

    /// Resolves once every creation scheduled so far has finished.
    pub async fn settled(&self) {
        let queue = self.generation().queue;
        queue.settled().await;
    }

    pub fn on_settled<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.generation().queue.on_settled(callback)
    }

    fn generation(&self) -> Generation {
        self.generation.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn creation_task(
        &self,
        generation: &Generation,
        local_id: LocalId,
    ) -> impl std::future::Future<Output = CreationResult> + Send + 'static {
        let api = self.api.clone();
        let store = self.store.clone();
        let query = self.query;
        let placeholder = self.placeholder.clone();
        let queue = generation.queue.clone();
        let requested = generation.requested.clone();

        async move {
            match api.create_menu_item(&placeholder).await {
                Ok(record) => {
                    let record_id = record.id;
                    if queue.is_halted() {
                        debug!(%query, %local_id, %record_id, "queue halted; mapping left untouched");
                        return Ok(record_id);
                    }
                    store.assign(query, record_id, local_id);
                    store.append_record(query, record);
                    Ok(record_id)
                }
                Err(err) => {
                    warn!(%query, %local_id, "menu item creation failed: {err}");
                    lock_requested(&requested).remove(&local_id);
                    Err(err)
                }
            }
        }
    }
}

fn lock_requested(requested: &Requested) -> MutexGuard<'_, HashSet<LocalId>> {
    requested.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests;
