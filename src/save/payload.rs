// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::flatten::{RecordUpdate, SaveEntry};
use crate::model::{MenuId, RecordId};

/// One batch save for a menu, as handed to the storage layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub menu_id: MenuId,
    /// Fresh per request so the server can tell batches apart.
    pub changeset_uuid: Uuid,
    pub entries: Vec<SaveEntry>,
}

impl SaveRequest {
    pub fn new(menu_id: MenuId, entries: Vec<SaveEntry>) -> Self {
        Self { menu_id, changeset_uuid: Uuid::new_v4(), entries }
    }

    pub fn updates(&self) -> impl Iterator<Item = &RecordUpdate> {
        self.entries.iter().filter_map(SaveEntry::as_update)
    }

    pub fn deletions(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.entries.iter().filter(|entry| entry.is_delete()).map(SaveEntry::id)
    }

    pub fn customized(&self) -> Value {
        customized_payload(self.menu_id, &self.entries)
    }
}

pub fn item_key(id: RecordId) -> String {
    format!("nav_menu_item[{id}]")
}

/// Encodes entries in the customizer's `customized` shape: one `nav_menu_item[<id>]` key per
/// record, holding the item settings for updates and `false` for deletions.
pub fn customized_payload(menu_id: MenuId, entries: &[SaveEntry]) -> Value {
    let mut object = Map::with_capacity(entries.len());
    for entry in entries {
        let value = match entry {
            SaveEntry::Update(update) => item_settings(menu_id, update),
            SaveEntry::Delete(_) => Value::Bool(false),
        };
        object.insert(item_key(entry.id()), value);
    }
    Value::Object(object)
}

fn item_settings(menu_id: MenuId, update: &RecordUpdate) -> Value {
    let mut item = update.extra.clone();
    let settings = json!({
        "id": update.id,
        "title": update.title,
        "url": update.url,
        "original_title": "",
        "classes": update.classes.join(" "),
        "xfn": update.xfn.join(" "),
        "nav_menu_term_id": menu_id,
        "menu_item_parent": update.parent_id,
        "position": update.position,
        "status": update.status.as_str(),
        "_invalid": false,
    });
    if let Value::Object(settings) = settings {
        item.extend(settings);
    }
    Value::Object(item)
}
