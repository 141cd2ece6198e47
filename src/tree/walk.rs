// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use smallvec::SmallVec;

use crate::model::{LocalId, Node};

/// One node of a pre-order walk.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a Node,
    /// Nearest non-container ancestor, `None` at top level.
    pub parent: Option<&'a Node>,
    /// 1 at top level. Containers do not count.
    pub depth: usize,
    /// 1-based rank among the node's siblings.
    pub position: usize,
}

struct Pending<'a> {
    node: &'a Node,
    parent: Option<&'a Node>,
    depth: usize,
    /// Index of the sibling counter this node draws its position from.
    counter: usize,
}

type WalkStack<'a> = SmallVec<[Pending<'a>; 16]>;

/// Pre-order walk of everything below `root`, skipping container nodes.
///
/// Containers are transparent: their children are visited as if they belonged to the nearest
/// non-container ancestor, and they do not take up a sibling position.
pub fn walk_tree(root: &Node) -> Vec<Visit<'_>> {
    let mut out = Vec::new();
    let mut counters = vec![0];
    let mut stack = WalkStack::new();
    push_children(&mut stack, root, None, 0, 0);

    while let Some(Pending { node, parent, depth, counter }) = stack.pop() {
        if node.is_container() {
            push_children(&mut stack, node, parent, depth, counter);
            continue;
        }

        counters[counter] += 1;
        out.push(Visit { node, parent, depth: depth + 1, position: counters[counter] });

        counters.push(0);
        push_children(&mut stack, node, Some(node), depth + 1, counters.len() - 1);
    }
    out
}

fn push_children<'a>(
    stack: &mut WalkStack<'a>,
    node: &'a Node,
    parent: Option<&'a Node>,
    depth: usize,
    counter: usize,
) {
    stack.extend(
        node.children().iter().rev().map(|child| Pending { node: child, parent, depth, counter }),
    );
}

/// Local ids of every non-container node below `root`.
pub fn local_ids(root: &Node) -> HashSet<LocalId> {
    walk_tree(root).into_iter().map(|visit| visit.node.local_id().clone()).collect()
}
