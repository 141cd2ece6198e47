// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Write as _;

use crate::model::{Mapping, Node};

const BRANCH: &str = "├─ ";
const LAST_BRANCH: &str = "└─ ";
const PIPE: &str = "│  ";
const GAP: &str = "   ";

/// Renders the tree below `root` as one line per link, drawn with box characters.
///
/// Each line shows the label, the url and either the bound record id (`#12`) or `(unsaved)`.
/// Container nodes are not drawn; their children appear in their place. An empty tree renders
/// as `(empty)`.
pub fn render_outline(root: &Node, mapping: &Mapping) -> String {
    let mut out = String::new();
    let mut stack = Vec::new();
    push_level(&mut stack, root, 0);
    if stack.is_empty() {
        out.push_str("(empty)\n");
        return out;
    }

    // One indent segment per ancestor level, set by whether that ancestor was a last child.
    let mut indents: Vec<&str> = Vec::new();
    while let Some(Line { node, last, depth }) = stack.pop() {
        indents.truncate(depth);
        for indent in &indents {
            out.push_str(indent);
        }
        let _ = write!(out, "{}{}", if last { LAST_BRANCH } else { BRANCH }, node.label());
        if !node.url().is_empty() {
            let _ = write!(out, "  {}", node.url());
        }
        match mapping.record_id(node.local_id()) {
            Some(id) => {
                let _ = writeln!(out, "  #{id}");
            }
            None => out.push_str("  (unsaved)\n"),
        }

        indents.push(if last { GAP } else { PIPE });
        push_level(&mut stack, node, depth + 1);
    }
    out
}

struct Line<'a> {
    node: &'a Node,
    last: bool,
    depth: usize,
}

fn push_level<'a>(stack: &mut Vec<Line<'a>>, node: &'a Node, depth: usize) {
    let children = visible_children(node);
    let count = children.len();
    stack.extend(
        children
            .into_iter()
            .enumerate()
            .rev()
            .map(|(index, child)| Line { node: child, last: index + 1 == count, depth }),
    );
}

fn visible_children(node: &Node) -> Vec<&Node> {
    let mut out = Vec::with_capacity(node.children().len());
    let mut pending: Vec<&Node> = node.children().iter().rev().collect();
    while let Some(child) = pending.pop() {
        if child.is_container() {
            pending.extend(child.children().iter().rev());
        } else {
            out.push(child);
        }
    }
    out
}
