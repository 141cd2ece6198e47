// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, HashSet};

use crate::model::node::assemble;
use crate::model::{LocalId, Mapping, Node, NodeAttributes, NodeKind, Record, RecordId};

/// A navigation tree freshly built from records, plus the ids it bound.
#[derive(Debug, Clone)]
pub struct BuiltTree {
    pub root: Node,
    pub mapping: Mapping,
}

/// Builds the navigation tree for a flat record collection.
///
/// Siblings are ordered by `order`, ties keep collection order. Records whose parent chain does
/// not reach the root (dangling parents, parent cycles) are left out, and a record id is only
/// ever turned into one node.
pub fn build_navigation_tree(records: &[Record]) -> BuiltTree {
    let mut by_parent: HashMap<RecordId, Vec<&Record>> = HashMap::new();
    for record in records {
        by_parent.entry(record.parent_id).or_default().push(record);
    }
    for group in by_parent.values_mut() {
        group.sort_by_key(|record| record.order);
    }

    let mut mapping = Mapping::new();
    let mut seen = HashSet::new();
    let mut items: Vec<(Option<usize>, Node)> = Vec::with_capacity(records.len());

    let mut stack: Vec<(Option<usize>, &Record)> = Vec::new();
    push_group(&mut stack, &by_parent, RecordId::ROOT, None);
    while let Some((parent, record)) = stack.pop() {
        if record.id.is_root() || !seen.insert(record.id) {
            continue;
        }
        let node = link_node(record);
        mapping.assign(record.id, node.local_id().clone());
        let index = items.len();
        items.push((parent, node));
        push_group(&mut stack, &by_parent, record.id, Some(index));
    }

    BuiltTree { root: Node::container(assemble(items)), mapping }
}

/// Pushes the children of `parent_id` so that they pop in sibling order.
fn push_group<'a>(
    stack: &mut Vec<(Option<usize>, &'a Record)>,
    by_parent: &HashMap<RecordId, Vec<&'a Record>>,
    parent_id: RecordId,
    parent: Option<usize>,
) {
    if let Some(group) = by_parent.get(&parent_id) {
        stack.extend(group.iter().rev().map(|record| (parent, *record)));
    }
}

fn link_node(record: &Record) -> Node {
    Node::with_id(
        LocalId::generate(),
        NodeKind::Link,
        NodeAttributes::new(record.title.clone(), record.url.clone()),
        Vec::new(),
    )
}
