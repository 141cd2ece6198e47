// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editing sessions over one menu each.
//!
//! A [`NavigationEditor`] owns everything that is shared between menus (the API, the record
//! cache, the per-menu exclusion runner). Opening a menu yields a [`MenuSession`] that holds the
//! current tree and the menu's creation queue.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::model::{LocalId, Mapping, MenuId, MenuQuery, Node, PlaceholderItem};
use crate::notice::{Notice, Notifier};
use crate::reconcile::{Materializer, ScheduledCreation};
use crate::save::{
    flatten_tree, Cycle, CycleId, ExclusiveOutcome, ExclusiveRunner, FlattenError, SaveEntry,
    SaveRequest,
};
use crate::store::{ApiError, EditorStore, MenuItemsApi};
use crate::tree::build_navigation_tree;

pub const SAVE_CYCLE: CycleId = CycleId::new("save");
pub const CREATE_MISSING_CYCLE: CycleId = CycleId::new("create-missing");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    Api(ApiError),
    Flatten(FlattenError),
    /// The server answered the save with `success: false`.
    SaveRejected { message: Option<String> },
    Creation { local_id: LocalId, source: ApiError },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(err) => write!(f, "menu items request failed: {err}"),
            Self::Flatten(err) => write!(f, "cannot flatten navigation tree: {err}"),
            Self::SaveRejected { message: Some(message) } => {
                write!(f, "save was rejected: {message}")
            }
            Self::SaveRejected { message: None } => f.write_str("save was rejected"),
            Self::Creation { local_id, source } => {
                write!(f, "cannot create menu item for node {local_id}: {source}")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Flatten(err) => Some(err),
            Self::SaveRejected { .. } => None,
            Self::Creation { source, .. } => Some(source),
        }
    }
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl From<FlattenError> for SyncError {
    fn from(err: FlattenError) -> Self {
        Self::Flatten(err)
    }
}

type Runner = ExclusiveRunner<MenuQuery, SyncError>;

pub struct NavigationEditor {
    api: Arc<dyn MenuItemsApi>,
    notifier: Arc<dyn Notifier>,
    config: EditorConfig,
    store: Arc<EditorStore>,
    runner: Arc<Runner>,
    sessions: Arc<Mutex<Sessions>>,
}

type Sessions = HashMap<MenuQuery, MenuSession>;

impl NavigationEditor {
    pub fn new(
        api: Arc<dyn MenuItemsApi>,
        notifier: Arc<dyn Notifier>,
        config: EditorConfig,
    ) -> Self {
        Self {
            api,
            notifier,
            config,
            store: Arc::new(EditorStore::new()),
            runner: ExclusiveRunner::new(),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<EditorStore> {
        &self.store
    }

    pub fn query_for(&self, menu_id: MenuId) -> MenuQuery {
        MenuQuery::new(menu_id).with_per_page(self.config.per_page)
    }

    /// Fetches the menu's records, builds its tree and adopts it as the menu's session.
    ///
    /// Opening a menu that already has a session replaces it; the old session's pending
    /// creations are discarded.
    pub async fn open(&self, menu_id: MenuId) -> Result<MenuSession, SyncError> {
        let query = self.query_for(menu_id);
        if let Some(previous) = self.lock_sessions().get(&query) {
            previous.0.materializer.halt();
        }
        let records = self.store.resolve_records(self.api.as_ref(), query).await?;
        let built = build_navigation_tree(&records);
        let skipped = records.len().saturating_sub(built.mapping.len());
        self.store.set_mapping(query, built.mapping);

        let session = MenuSession(Arc::new(SessionInner {
            query,
            api: self.api.clone(),
            notifier: self.notifier.clone(),
            store: self.store.clone(),
            runner: self.runner.clone(),
            materializer: Materializer::new(
                query,
                self.api.clone(),
                self.store.clone(),
                self.config.placeholder.clone(),
                self.config.creation_concurrency,
            ),
            placeholder: self.config.placeholder.clone(),
            tree: Mutex::new(built.root),
        }));

        self.lock_sessions().insert(query, session.clone());
        info!(%query, items = records.len(), skipped, "menu opened");
        Ok(session)
    }

    pub fn session(&self, menu_id: MenuId) -> Option<MenuSession> {
        self.lock_sessions().get(&self.query_for(menu_id)).cloned()
    }

    /// Ends the menu's session and drops its cached state. Returns false if no session was open.
    ///
    /// A save or creation cycle still running for the menu finishes first; the state is dropped
    /// once the menu goes idle, unless it has been opened again by then.
    pub fn close(&self, menu_id: MenuId) -> bool {
        let query = self.query_for(menu_id);
        let Some(session) = self.lock_sessions().remove(&query) else {
            return false;
        };
        session.0.materializer.halt();
        if self.runner.forget(&query) {
            self.store.forget(&query);
        } else {
            self.forget_when_idle(query);
        }
        true
    }

    fn forget_when_idle(&self, query: MenuQuery) {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!(%query, "no runtime to clear closed menu once idle; keeping its state");
            return;
        }

        debug!(%query, "menu busy; clearing its state once idle");
        let runner = self.runner.clone();
        let store = self.store.clone();
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            loop {
                runner.wait_idle(&query).await;
                let done = {
                    let sessions = lock_sessions(&sessions);
                    if sessions.contains_key(&query) {
                        true
                    } else if runner.forget(&query) {
                        store.forget(&query);
                        true
                    } else {
                        false
                    }
                };
                if done {
                    return;
                }
            }
        });
    }

    fn lock_sessions(&self) -> MutexGuard<'_, Sessions> {
        lock_sessions(&self.sessions)
    }
}

fn lock_sessions(sessions: &Mutex<Sessions>) -> MutexGuard<'_, Sessions> {
    sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct SessionInner {
    query: MenuQuery,
    api: Arc<dyn MenuItemsApi>,
    notifier: Arc<dyn Notifier>,
    store: Arc<EditorStore>,
    runner: Arc<Runner>,
    materializer: Materializer,
    placeholder: PlaceholderItem,
    tree: Mutex<Node>,
}

/// Handle to one open menu. Clones share the session.
#[derive(Clone)]
pub struct MenuSession(Arc<SessionInner>);

impl fmt::Debug for MenuSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuSession").field("query", &self.0.query).finish_non_exhaustive()
    }
}

impl MenuSession {
    pub fn query(&self) -> MenuQuery {
        self.0.query
    }

    pub fn menu_id(&self) -> MenuId {
        self.0.query.menu_id()
    }

    /// Snapshot of the current tree.
    pub fn tree(&self) -> Node {
        self.0.lock_tree().clone()
    }

    pub fn mapping(&self) -> Mapping {
        self.0.store.mapping(&self.0.query)
    }

    /// Adopts `next` as the current tree and schedules creations for its new nodes.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn apply_tree(&self, next: Node) -> Vec<ScheduledCreation> {
        let mut tree = self.0.lock_tree();
        let previous = std::mem::replace(&mut *tree, next);
        self.0.materializer.reconcile(Some(&previous), &tree)
    }

    /// Edits a copy of the current tree with `edit`, then applies it.
    pub fn edit<R>(&self, edit: impl FnOnce(&mut Node) -> R) -> (R, Vec<ScheduledCreation>) {
        let mut next = self.tree();
        let output = edit(&mut next);
        (output, self.apply_tree(next))
    }

    /// Resolves once every creation scheduled so far has finished.
    pub async fn settled(&self) {
        self.0.materializer.settled().await;
    }

    /// Saves the current tree once pending creations have settled.
    ///
    /// Returns [`ExclusiveOutcome::Queued`] when another cycle holds the menu; the save then
    /// runs after it, against whatever the tree is at that point.
    pub async fn save(&self) -> Result<ExclusiveOutcome, SyncError> {
        self.settled().await;
        let inner = self.0.clone();
        let cycle = Cycle::new(SAVE_CYCLE, move || {
            let inner = inner.clone();
            async move { inner.save_now().await }
        });
        self.0.runner.run_exclusive(self.0.query, cycle).await
    }

    /// Creates records, one call at a time, for every node that still has none.
    pub async fn create_missing_menu_items(&self) -> Result<ExclusiveOutcome, SyncError> {
        let inner = self.0.clone();
        let cycle = Cycle::new(CREATE_MISSING_CYCLE, move || {
            let inner = inner.clone();
            async move { inner.create_missing().await }
        });
        self.0.runner.run_exclusive(self.0.query, cycle).await
    }

    /// Resolves once no save or creation cycle is running or parked for this menu.
    pub async fn idle(&self) {
        self.0.runner.wait_idle(&self.0.query).await;
    }

    pub fn is_processing(&self) -> bool {
        self.0.runner.is_processing(&self.0.query)
    }

    /// Discards pending creations and starts a fresh creation queue.
    pub fn reset(&self) {
        self.0.materializer.reset();
    }

    /// Re-fetches the menu and rebuilds the tree from it, dropping local edits.
    pub async fn reload(&self) -> Result<(), SyncError> {
        let records = self.0.store.resolve_records(self.0.api.as_ref(), self.0.query).await?;
        let built = build_navigation_tree(&records);
        self.0.materializer.reset();
        self.0.store.set_mapping(self.0.query, built.mapping);
        *self.0.lock_tree() = built.root;
        Ok(())
    }

    /// Entries the next save would send, computed from the current tree.
    pub fn pending_entries(&self) -> Result<Vec<SaveEntry>, FlattenError> {
        self.0.flatten()
    }
}

impl SessionInner {
    fn lock_tree(&self) -> MutexGuard<'_, Node> {
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn flatten(&self) -> Result<Vec<SaveEntry>, FlattenError> {
        let tree = self.lock_tree().clone();
        let mapping = self.store.mapping(&self.query);
        let prior = self.store.records(&self.query).unwrap_or_default();
        flatten_tree(&tree, &mapping, &prior)
    }

    async fn save_now(&self) -> Result<(), SyncError> {
        self.materializer.settled().await;
        let result = self.submit().await;
        match &result {
            Ok(()) => self.notifier.notify(Notice::saved()),
            Err(err) => {
                warn!(query = %self.query, "save failed: {err}");
                self.notifier.notify(Notice::error());
            }
        }
        result
    }

    async fn submit(&self) -> Result<(), SyncError> {
        let request = SaveRequest::new(self.query.menu_id(), self.flatten()?);
        let response = self.api.submit_save(&request).await?;
        if !response.success {
            return Err(SyncError::SaveRejected { message: response.message });
        }

        self.store.apply_save(self.query, &request);
        info!(
            query = %self.query,
            changeset = %request.changeset_uuid,
            updated = request.updates().count(),
            deleted = request.deletions().count(),
            "navigation saved"
        );
        Ok(())
    }

    async fn create_missing(&self) -> Result<(), SyncError> {
        self.materializer.settled().await;
        let tree = self.lock_tree().clone();

        let mut stack: Vec<&Node> = tree.children().iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children().iter().rev());
            if node.is_container() || self.store.record_id_for(&self.query, node.local_id()).is_some()
            {
                continue;
            }

            let record = self.api.create_menu_item(&self.placeholder).await.map_err(|source| {
                SyncError::Creation { local_id: node.local_id().clone(), source }
            })?;
            self.store.assign(self.query, record.id, node.local_id().clone());
            self.store.append_record(self.query, record);
        }
        Ok(())
    }
}
