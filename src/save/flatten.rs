// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::model::{LocalId, Mapping, Node, Record, RecordId, RecordStatus};
use crate::tree::walk_tree;

/// Opaque record fields that never travel back to the server.
const STRIPPED_FIELDS: [&str; 3] = ["menus", "meta", "_links"];

/// Full replacement for one record, derived from tree shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordUpdate {
    pub id: RecordId,
    pub parent_id: RecordId,
    /// 1-based rank among siblings.
    pub position: usize,
    pub title: String,
    pub url: String,
    pub classes: Vec<String>,
    pub xfn: Vec<String>,
    pub status: RecordStatus,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveEntry {
    Update(RecordUpdate),
    Delete(RecordId),
}

impl SaveEntry {
    pub fn id(&self) -> RecordId {
        match self {
            Self::Update(update) => update.id,
            Self::Delete(id) => *id,
        }
    }

    pub fn as_update(&self) -> Option<&RecordUpdate> {
        match self {
            Self::Update(update) => Some(update),
            Self::Delete(_) => None,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlattenError {
    /// A node has no record yet; its creation has not settled or has failed.
    UnboundNode { local_id: LocalId, label: String },
}

impl fmt::Display for FlattenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundNode { local_id, label } => {
                write!(f, "node {local_id} ({label:?}) has no menu item yet")
            }
        }
    }
}

impl std::error::Error for FlattenError {}

/// Flattens the tree below `root` into one entry per record.
///
/// Every node yields an update carrying its recomputed parent and position, its current label
/// and url, and the non-positional fields of its prior record. Every prior record that no node
/// is bound to any more yields a deletion.
pub fn flatten_tree(
    root: &Node,
    mapping: &Mapping,
    prior: &[Record],
) -> Result<Vec<SaveEntry>, FlattenError> {
    let prior_by_id: HashMap<RecordId, &Record> =
        prior.iter().map(|record| (record.id, record)).collect();

    let mut entries = Vec::new();
    let mut emitted = HashSet::new();

    for visit in walk_tree(root) {
        let id = bound_id(mapping, visit.node)?;
        let parent_id = match visit.parent {
            Some(parent) => bound_id(mapping, parent)?,
            None => RecordId::ROOT,
        };
        if !emitted.insert(id) {
            continue;
        }

        let base = prior_by_id.get(&id).copied();
        entries.push(SaveEntry::Update(RecordUpdate {
            id,
            parent_id,
            position: visit.position,
            title: visit.node.label().to_owned(),
            url: visit.node.url().to_owned(),
            classes: base.map(|record| record.classes.clone()).unwrap_or_default(),
            xfn: base.map(|record| record.xfn.clone()).unwrap_or_default(),
            status: RecordStatus::Publish,
            extra: base.map(carried_fields).unwrap_or_default(),
        }));
    }

    for record in prior {
        if emitted.insert(record.id) {
            entries.push(SaveEntry::Delete(record.id));
        }
    }

    Ok(entries)
}

fn bound_id(mapping: &Mapping, node: &Node) -> Result<RecordId, FlattenError> {
    mapping.record_id(node.local_id()).ok_or_else(|| FlattenError::UnboundNode {
        local_id: node.local_id().clone(),
        label: node.label().to_owned(),
    })
}

fn carried_fields(record: &Record) -> serde_json::Map<String, serde_json::Value> {
    record
        .extra
        .iter()
        .filter(|(key, _)| !STRIPPED_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{flatten_tree, FlattenError, SaveEntry};
    use crate::model::{Node, Record, RecordId, RecordStatus};
    use crate::tree::build_navigation_tree;

    fn record(id: u64, parent: u64, order: i64, title: &str) -> Record {
        Record::new(RecordId::new(id), title, format!("/{id}"))
            .with_parent(RecordId::new(parent))
            .with_order(order)
    }

    fn shape(entries: &[SaveEntry]) -> BTreeMap<u64, (u64, usize)> {
        entries
            .iter()
            .filter_map(SaveEntry::as_update)
            .map(|update| (update.id.get(), (update.parent_id.get(), update.position)))
            .collect()
    }

    #[test]
    fn unchanged_tree_reproduces_parent_and_order() {
        let records = vec![
            record(1, 0, 1, "Home"),
            record(2, 0, 2, "Blog"),
            record(3, 2, 1, "Post"),
            record(4, 2, 2, "Archive"),
            record(5, 4, 1, "2025"),
        ];
        let built = build_navigation_tree(&records);
        let entries = flatten_tree(&built.root, &built.mapping, &records).unwrap();

        let expected: BTreeMap<u64, (u64, usize)> = records
            .iter()
            .map(|r| (r.id.get(), (r.parent_id.get(), r.order as usize)))
            .collect();
        assert_eq!(shape(&entries), expected);
        assert!(entries.iter().all(|entry| !entry.is_delete()));
    }

    #[test]
    fn removed_node_becomes_a_deletion() {
        let records = vec![record(1, 0, 1, "A"), record(2, 0, 2, "B"), record(3, 0, 3, "C")];
        let mut built = build_navigation_tree(&records);
        let b = built.root.children()[1].local_id().clone();
        built.root.remove(&b).unwrap();

        let entries = flatten_tree(&built.root, &built.mapping, &records).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(shape(&entries), BTreeMap::from([(1, (0, 1)), (3, (0, 2))]));
        let deleted: Vec<_> =
            entries.iter().filter(|e| e.is_delete()).map(SaveEntry::id).collect();
        assert_eq!(deleted, [RecordId::new(2)]);
    }

    #[test]
    fn removing_a_parent_deletes_its_whole_subtree() {
        let records = vec![record(1, 0, 1, "A"), record(2, 1, 1, "B"), record(3, 2, 1, "C")];
        let mut built = build_navigation_tree(&records);
        let a = built.root.children()[0].local_id().clone();
        built.root.remove(&a).unwrap();

        let entries = flatten_tree(&built.root, &built.mapping, &records).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(SaveEntry::is_delete));
    }

    #[test]
    fn updates_take_label_and_url_from_the_node_and_keep_other_fields() {
        let mut prior = record(1, 0, 1, "Old");
        prior.classes = vec!["highlight".to_owned()];
        prior.extra.insert("target".to_owned(), serde_json::json!("_blank"));
        prior.extra.insert("_links".to_owned(), serde_json::json!({"self": []}));
        let records = vec![prior];

        let mut built = build_navigation_tree(&records);
        let node = built.root.children_mut()[0].attributes_mut();
        node.label = "New".to_owned();
        node.url = "/new".to_owned();

        let entries = flatten_tree(&built.root, &built.mapping, &records).unwrap();
        let update = entries[0].as_update().unwrap();
        assert_eq!(update.title, "New");
        assert_eq!(update.url, "/new");
        assert_eq!(update.status, RecordStatus::Publish);
        assert_eq!(update.classes, ["highlight"]);
        assert_eq!(update.extra.get("target"), Some(&serde_json::json!("_blank")));
        assert!(!update.extra.contains_key("_links"));
    }

    #[test]
    fn moved_node_gets_new_parent_and_position() {
        let records = vec![record(1, 0, 1, "A"), record(2, 0, 2, "B"), record(3, 0, 3, "C")];
        let mut built = build_navigation_tree(&records);
        let a = built.root.children()[0].local_id().clone();
        let c = built.root.children()[2].local_id().clone();
        built.root.move_node(&c, &a, 0).unwrap();

        let entries = flatten_tree(&built.root, &built.mapping, &records).unwrap();
        assert_eq!(shape(&entries), BTreeMap::from([(1, (0, 1)), (3, (1, 1)), (2, (0, 2))]));
    }

    #[test]
    fn unbound_node_is_reported() {
        let records = vec![record(1, 0, 1, "A")];
        let mut built = build_navigation_tree(&records);
        let fresh = Node::link("Fresh", "/fresh");
        built.root.push_child(fresh.clone());

        let err = flatten_tree(&built.root, &built.mapping, &records).unwrap_err();
        assert_eq!(
            err,
            FlattenError::UnboundNode { local_id: fresh.local_id().clone(), label: "Fresh".into() }
        );
    }
}
