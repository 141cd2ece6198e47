// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::Notify;
use tracing::debug;

use super::api::{ApiError, MenuItemsApi};
use crate::model::{LocalId, Mapping, MenuQuery, Record, RecordId, RecordStatus};
use crate::save::{SaveEntry, SaveRequest};

#[derive(Debug, Default)]
struct ScopeState {
    /// `None` until the first fetch for this scope lands.
    records: Option<Vec<Record>>,
    resolving: bool,
    mapping: Mapping,
}

/// Client-side cache of fetched records and record/node mappings, keyed by [`MenuQuery`].
///
/// Every method takes the lock for a single step; nothing is held across an await.
#[derive(Debug, Default)]
pub struct EditorStore {
    scopes: Mutex<HashMap<MenuQuery, ScopeState>>,
    resolved: Notify,
}

impl EditorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self, query: &MenuQuery) -> Option<Vec<Record>> {
        self.lock().get(query).and_then(|scope| scope.records.clone())
    }

    pub fn has_records(&self, query: &MenuQuery) -> bool {
        self.lock().get(query).is_some_and(|scope| scope.records.is_some())
    }

    pub fn is_resolving(&self, query: &MenuQuery) -> bool {
        self.lock().get(query).is_some_and(|scope| scope.resolving)
    }

    pub fn start_resolving(&self, query: MenuQuery) {
        self.lock().entry(query).or_default().resolving = true;
    }

    /// Replaces the cached collection with a fresh fetch result.
    pub fn receive_records(&self, query: MenuQuery, records: Vec<Record>) {
        {
            let mut scopes = self.lock();
            let scope = scopes.entry(query).or_default();
            scope.records = Some(records);
            scope.resolving = false;
        }
        self.resolved.notify_waiters();
    }

    pub fn fail_resolving(&self, query: &MenuQuery) {
        if let Some(scope) = self.lock().get_mut(query) {
            scope.resolving = false;
        }
        self.resolved.notify_waiters();
    }

    /// Fetches the collection for `query` through `api`, marking the scope as resolving while
    /// the request is in flight.
    pub async fn resolve_records(
        &self,
        api: &dyn MenuItemsApi,
        query: MenuQuery,
    ) -> Result<Vec<Record>, ApiError> {
        self.start_resolving(query);
        match api.fetch_menu_items(&query).await {
            Ok(records) => {
                debug!(%query, count = records.len(), "menu items resolved");
                self.receive_records(query, records.clone());
                Ok(records)
            }
            Err(err) => {
                self.fail_resolving(&query);
                Err(err)
            }
        }
    }

    /// Resolves once no fetch is in flight for `query`.
    pub async fn wait_resolved(&self, query: &MenuQuery) {
        loop {
            let notified = self.resolved.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_resolving(query) {
                return;
            }
            notified.await;
        }
    }

    /// Adds a freshly created record to the cached collection. Never replaces an entry that a
    /// concurrent fetch already delivered.
    pub fn append_record(&self, query: MenuQuery, record: Record) {
        let mut scopes = self.lock();
        let records = scopes.entry(query).or_default().records.get_or_insert_with(Vec::new);
        if records.iter().all(|existing| existing.id != record.id) {
            records.push(record);
        }
    }

    pub fn mapping(&self, query: &MenuQuery) -> Mapping {
        self.lock().get(query).map(|scope| scope.mapping.clone()).unwrap_or_default()
    }

    pub fn set_mapping(&self, query: MenuQuery, mapping: Mapping) {
        self.lock().entry(query).or_default().mapping = mapping;
    }

    pub fn assign(&self, query: MenuQuery, record_id: RecordId, local_id: LocalId) {
        self.lock().entry(query).or_default().mapping.assign(record_id, local_id);
    }

    pub fn record_id_for(&self, query: &MenuQuery, local_id: &LocalId) -> Option<RecordId> {
        self.lock().get(query).and_then(|scope| scope.mapping.record_id(local_id))
    }

    /// Mirrors an accepted save into the cache: deleted records leave the collection and the
    /// mapping, updated records take their new shape.
    pub fn apply_save(&self, query: MenuQuery, request: &SaveRequest) {
        let mut scopes = self.lock();
        let scope = scopes.entry(query).or_default();
        let records = scope.records.get_or_insert_with(Vec::new);

        for entry in &request.entries {
            match entry {
                SaveEntry::Delete(id) => {
                    records.retain(|record| record.id != *id);
                    scope.mapping.unassign_record(*id);
                }
                SaveEntry::Update(update) => {
                    let index = match records.iter().position(|record| record.id == update.id) {
                        Some(index) => index,
                        None => {
                            records.push(Record::new(update.id, "", ""));
                            records.len() - 1
                        }
                    };
                    let record = &mut records[index];
                    record.parent_id = update.parent_id;
                    record.order = update.position as i64;
                    record.title.clone_from(&update.title);
                    record.url.clone_from(&update.url);
                    record.classes.clone_from(&update.classes);
                    record.xfn.clone_from(&update.xfn);
                    record.status = RecordStatus::Publish;
                    record.menus = Some(request.menu_id);
                }
            }
        }
    }

    /// Drops everything cached for `query`.
    pub fn forget(&self, query: &MenuQuery) {
        self.lock().remove(query);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MenuQuery, ScopeState>> {
        self.scopes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
