// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, HashMap};

use super::ids::{LocalId, RecordId};

/// Bidirectional `RecordId <-> LocalId` association for one menu.
///
/// Both directions are kept one-to-one: assigning a pair evicts any previous partner of either
/// side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    by_record: BTreeMap<RecordId, LocalId>,
    by_local: HashMap<LocalId, RecordId>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, record_id: RecordId, local_id: LocalId) {
        if let Some(previous_local) = self.by_record.remove(&record_id) {
            self.by_local.remove(&previous_local);
        }
        if let Some(previous_record) = self.by_local.remove(&local_id) {
            self.by_record.remove(&previous_record);
        }
        self.by_record.insert(record_id, local_id.clone());
        self.by_local.insert(local_id, record_id);
    }

    pub fn local_id(&self, record_id: RecordId) -> Option<&LocalId> {
        self.by_record.get(&record_id)
    }

    pub fn record_id(&self, local_id: &LocalId) -> Option<RecordId> {
        self.by_local.get(local_id).copied()
    }

    pub fn contains_local(&self, local_id: &LocalId) -> bool {
        self.by_local.contains_key(local_id)
    }

    pub fn unassign_record(&mut self, record_id: RecordId) -> Option<LocalId> {
        let local_id = self.by_record.remove(&record_id)?;
        self.by_local.remove(&local_id);
        Some(local_id)
    }

    /// Pairs in ascending record id order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &LocalId)> {
        self.by_record.iter().map(|(record_id, local_id)| (*record_id, local_id))
    }

    pub fn len(&self) -> usize {
        self.by_record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_record.is_empty()
    }
}

impl FromIterator<(RecordId, LocalId)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (RecordId, LocalId)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (record_id, local_id) in iter {
            mapping.assign(record_id, local_id);
        }
        mapping
    }
}
