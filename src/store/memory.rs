// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::api::{ApiError, MenuItemsApi, SaveResponse};
use super::records_file::{load_records, write_records, StoreError};
use crate::model::{MenuQuery, PlaceholderItem, Record, RecordId, RecordStatus};
use crate::save::{SaveEntry, SaveRequest};

/// What the next [`MenuItemsApi::submit_save`] call does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveOutcome {
    #[default]
    Accept,
    /// Respond with `success: false`.
    Reject(String),
    /// Fail without a response.
    Transport(String),
}

#[derive(Debug, Default)]
struct BackendState {
    records: BTreeMap<RecordId, Record>,
    last_id: u64,
    failing_creates: usize,
    next_save: SaveOutcome,
    saves: Vec<SaveRequest>,
    created: Vec<RecordId>,
    creating: usize,
    max_creating: usize,
}

/// In-process menu item storage.
///
/// Ids are handed out sequentially when a create call starts, so creation order is observable
/// even when responses interleave. Saves are all-or-nothing.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<BackendState>,
    create_delay: Option<Duration>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            for record in records {
                state.last_id = state.last_id.max(record.id.get());
                state.records.insert(record.id, record);
            }
        }
        backend
    }

    /// Every create call sleeps for `delay` before responding.
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::with_records(load_records(path)?))
    }

    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        write_records(path, &self.records())
    }

    /// Makes the next `count` create calls fail with a server error.
    pub fn fail_next_creates(&self, count: usize) {
        self.lock().failing_creates = count;
    }

    /// Sets the outcome of the next save. Later saves are accepted again.
    pub fn set_next_save(&self, outcome: SaveOutcome) {
        self.lock().next_save = outcome;
    }

    pub fn records(&self) -> Vec<Record> {
        self.lock().records.values().cloned().collect()
    }

    pub fn record(&self, id: RecordId) -> Option<Record> {
        self.lock().records.get(&id).cloned()
    }

    /// Every save request received, including rejected ones.
    pub fn saves(&self) -> Vec<SaveRequest> {
        self.lock().saves.clone()
    }

    /// Ids of successfully created records, in creation order.
    pub fn created_ids(&self) -> Vec<RecordId> {
        self.lock().created.clone()
    }

    pub fn max_concurrent_creates(&self) -> usize {
        self.lock().max_creating
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MenuItemsApi for MemoryBackend {
    async fn create_menu_item(&self, placeholder: &PlaceholderItem) -> Result<Record, ApiError> {
        let assigned = {
            let mut state = self.lock();
            state.creating += 1;
            state.max_creating = state.max_creating.max(state.creating);
            if state.failing_creates > 0 {
                state.failing_creates -= 1;
                None
            } else {
                state.last_id += 1;
                Some(RecordId::new(state.last_id))
            }
        };

        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        state.creating -= 1;
        let Some(id) = assigned else {
            return Err(ApiError::Status {
                code: 500,
                message: "could not create menu item".to_owned(),
            });
        };

        let record = Record::new(id, placeholder.title.clone(), placeholder.url.clone())
            .with_order(placeholder.order);
        state.records.insert(id, record.clone());
        state.created.push(id);
        debug!(%id, "menu item created");
        Ok(record)
    }

    async fn fetch_menu_items(&self, query: &MenuQuery) -> Result<Vec<Record>, ApiError> {
        let state = self.lock();
        let matching = state.records.values().filter(|record| record.menus == Some(query.menus));
        let records = match usize::try_from(query.per_page) {
            Ok(limit) => matching.take(limit).cloned().collect(),
            Err(_) => matching.cloned().collect(),
        };
        Ok(records)
    }

    async fn submit_save(&self, request: &SaveRequest) -> Result<SaveResponse, ApiError> {
        let mut state = self.lock();
        state.saves.push(request.clone());

        match std::mem::take(&mut state.next_save) {
            SaveOutcome::Accept => {}
            SaveOutcome::Reject(message) => return Ok(SaveResponse::rejected(message)),
            SaveOutcome::Transport(message) => return Err(ApiError::Transport(message)),
        }

        if let Some(unknown) =
            request.entries.iter().map(SaveEntry::id).find(|id| !state.records.contains_key(id))
        {
            return Ok(SaveResponse::rejected(format!("unknown menu item {unknown}")));
        }

        for entry in &request.entries {
            match entry {
                SaveEntry::Delete(id) => {
                    state.records.remove(id);
                }
                SaveEntry::Update(update) => {
                    let Some(record) = state.records.get_mut(&update.id) else {
                        continue;
                    };
                    record.parent_id = update.parent_id;
                    record.order = update.position as i64;
                    record.title.clone_from(&update.title);
                    record.url.clone_from(&update.url);
                    record.classes.clone_from(&update.classes);
                    record.xfn.clone_from(&update.xfn);
                    record.status = RecordStatus::Publish;
                    record.menus = Some(request.menu_id);
                    for (key, value) in &update.extra {
                        record.extra.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        debug!(menu = %request.menu_id, entries = request.entries.len(), "save applied");
        Ok(SaveResponse::accepted())
    }
}
