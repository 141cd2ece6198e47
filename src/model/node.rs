// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::ids::LocalId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The navigation root. Never backed by a record.
    Container,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeAttributes {
    pub label: String,
    pub url: String,
}

impl NodeAttributes {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self { label: label.into(), url: url.into() }
    }
}

/// An element of the editable navigation tree.
///
/// Trees can be as deep as the record chains they are built from, so every traversal here
/// (including `Clone`, `PartialEq` and `Drop`) runs on an explicit stack.
#[derive(Debug)]
pub struct Node {
    local_id: LocalId,
    kind: NodeKind,
    attributes: NodeAttributes,
    children: Vec<Node>,
}

impl Node {
    pub fn container(children: Vec<Node>) -> Self {
        Self::with_id(LocalId::generate(), NodeKind::Container, NodeAttributes::default(), children)
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_id(
            LocalId::generate(),
            NodeKind::Link,
            NodeAttributes::new(label, url),
            Vec::new(),
        )
    }

    pub fn with_id(
        local_id: LocalId,
        kind: NodeKind,
        attributes: NodeAttributes,
        children: Vec<Node>,
    ) -> Self {
        Self { local_id, kind, attributes, children }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn local_id(&self) -> &LocalId {
        &self.local_id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }

    pub fn attributes(&self) -> &NodeAttributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut NodeAttributes {
        &mut self.attributes
    }

    pub fn label(&self) -> &str {
        &self.attributes.label
    }

    pub fn url(&self) -> &str {
        &self.attributes.url
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn find(&self, local_id: &LocalId) -> Option<&Node> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if &node.local_id == local_id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    pub fn find_mut(&mut self, local_id: &LocalId) -> Option<&mut Node> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if &node.local_id == local_id {
                return Some(node);
            }
            stack.extend(node.children.iter_mut().rev());
        }
        None
    }

    pub fn contains(&self, local_id: &LocalId) -> bool {
        self.find(local_id).is_some()
    }

    /// Detaches the descendant with `local_id` (with its subtree). The node itself cannot be
    /// removed from itself.
    pub fn remove(&mut self, local_id: &LocalId) -> Option<Node> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(index) = node.children.iter().position(|child| &child.local_id == local_id)
            {
                return Some(node.children.remove(index));
            }
            stack.extend(node.children.iter_mut());
        }
        None
    }

    /// Inserts `node` as a child of `parent` at `index` (clamped to the child count).
    pub fn insert(
        &mut self,
        parent: &LocalId,
        index: usize,
        node: Node,
    ) -> Result<(), TreeEditError> {
        if self.contains(&node.local_id) {
            return Err(TreeEditError::DuplicateNode { local_id: node.local_id.clone() });
        }
        let parent_node = self
            .find_mut(parent)
            .ok_or_else(|| TreeEditError::UnknownNode { local_id: parent.clone() })?;
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, node);
        Ok(())
    }

    /// Moves the subtree rooted at `local_id` under `new_parent` at `index`.
    pub fn move_node(
        &mut self,
        local_id: &LocalId,
        new_parent: &LocalId,
        index: usize,
    ) -> Result<(), TreeEditError> {
        let moving = self
            .find(local_id)
            .ok_or_else(|| TreeEditError::UnknownNode { local_id: local_id.clone() })?;
        if moving.contains(new_parent) {
            return Err(TreeEditError::MoveIntoSelf { local_id: local_id.clone() });
        }
        if !self.contains(new_parent) {
            return Err(TreeEditError::UnknownNode { local_id: new_parent.clone() });
        }

        let node = self
            .remove(local_id)
            .ok_or_else(|| TreeEditError::UnknownNode { local_id: local_id.clone() })?;
        self.insert(new_parent, index, node)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    fn shallow_clone(&self) -> Self {
        Self::with_id(self.local_id.clone(), self.kind, self.attributes.clone(), Vec::new())
    }
}

/// Nests childless nodes listed in pre-order, each paired with the index of its parent in the
/// same list (`None` at top level). Returns the top-level nodes in order.
pub(crate) fn assemble(mut items: Vec<(Option<usize>, Node)>) -> Vec<Node> {
    let mut top = Vec::new();
    while let Some((parent, mut node)) = items.pop() {
        node.children.reverse();
        match parent.and_then(|index| items.get_mut(index)) {
            Some((_, parent)) => parent.children.push(node),
            None => top.push(node),
        }
    }
    top.reverse();
    top
}

impl Clone for Node {
    fn clone(&self) -> Self {
        let mut items = Vec::new();
        let mut stack: Vec<(Option<usize>, &Node)> =
            self.children.iter().rev().map(|child| (None, child)).collect();
        while let Some((parent, node)) = stack.pop() {
            let index = items.len();
            items.push((parent, node.shallow_clone()));
            stack.extend(node.children.iter().rev().map(|child| (Some(index), child)));
        }

        let mut copy = self.shallow_clone();
        copy.children = assemble(items);
        copy
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.local_id != b.local_id
                || a.kind != b.kind
                || a.attributes != b.attributes
                || a.children.len() != b.children.len()
            {
                return false;
            }
            stack.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

impl Eq for Node {}

impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEditError {
    UnknownNode { local_id: LocalId },
    DuplicateNode { local_id: LocalId },
    MoveIntoSelf { local_id: LocalId },
}

impl fmt::Display for TreeEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode { local_id } => write!(f, "unknown node {local_id}"),
            Self::DuplicateNode { local_id } => write!(f, "node {local_id} is already in the tree"),
            Self::MoveIntoSelf { local_id } => {
                write!(f, "cannot move node {local_id} into its own subtree")
            }
        }
    }
}

impl std::error::Error for TreeEditError {}
