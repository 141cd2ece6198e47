// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Navsync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Navsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};

use super::{diff_new_nodes, Materializer};
use crate::model::{MenuId, MenuQuery, Node, PlaceholderItem, Record, RecordId};
use crate::queue::QueueError;
use crate::store::{EditorStore, MemoryBackend};
use crate::tree::build_navigation_tree;

struct Ctx {
    backend: Arc<MemoryBackend>,
    store: Arc<EditorStore>,
    query: MenuQuery,
}

impl Ctx {
    fn with_backend(backend: MemoryBackend) -> Self {
        Self {
            backend: Arc::new(backend),
            store: Arc::new(EditorStore::new()),
            query: MenuQuery::new(MenuId::new(1)),
        }
    }

    fn materializer(&self, limit: usize) -> Materializer {
        Materializer::new(
            self.query,
            self.backend.clone(),
            self.store.clone(),
            PlaceholderItem::default(),
            limit,
        )
    }
}

#[fixture]
fn ctx() -> Ctx {
    Ctx::with_backend(MemoryBackend::new())
}

/// `root -> [Home, Blog -> [Post]]`
fn blog_tree() -> Node {
    Node::container(vec![
        Node::link("Home", "/"),
        Node::link("Blog", "/blog").with_children(vec![Node::link("Post", "/blog/post")]),
    ])
}

fn flat_links(count: usize) -> Node {
    Node::container((0..count).map(|i| Node::link(format!("n{i}"), format!("/{i}"))).collect())
}

#[test]
fn diff_reports_only_unseen_nodes_in_pre_order() {
    let previous = blog_tree();
    let mut next = previous.clone();
    let blog = next.children()[1].local_id().clone();
    let fresh = Node::link("Fresh", "/fresh");
    next.insert(&blog, 0, fresh.clone()).unwrap();
    let home = next.children()[0].local_id().clone();
    next.move_node(&home, &blog, 5).unwrap();

    let new_nodes = diff_new_nodes(Some(&previous), &next);
    assert_eq!(new_nodes.len(), 1);
    assert_eq!(new_nodes[0].node.local_id(), fresh.local_id());

    let labels: Vec<_> =
        diff_new_nodes(None, &blog_tree()).iter().map(|v| v.node.label().to_owned()).collect();
    assert_eq!(labels, ["Home", "Blog", "Post"]);
}

#[rstest]
#[tokio::test]
async fn new_nodes_are_created_in_first_seen_order(ctx: Ctx) {
    let materializer = ctx.materializer(5);
    let tree = blog_tree();

    let scheduled = materializer.reconcile(None, &tree);
    let order: Vec<_> = scheduled.iter().map(|s| s.local_id.clone()).collect();
    let expected: Vec<_> = diff_new_nodes(None, &tree)
        .iter()
        .map(|visit| visit.node.local_id().clone())
        .collect();
    assert_eq!(order, expected);

    let mut ids = Vec::new();
    for creation in scheduled {
        ids.push(creation.handle.join().await.unwrap().unwrap());
    }
    materializer.settled().await;

    assert_eq!(ids, [RecordId::new(1), RecordId::new(2), RecordId::new(3)]);
    assert_eq!(ctx.backend.created_ids(), ids);
    for (local_id, id) in order.iter().zip(&ids) {
        assert_eq!(ctx.store.record_id_for(&ctx.query, local_id), Some(*id));
    }
    let cached = ctx.store.records(&ctx.query).unwrap();
    assert_eq!(cached.iter().map(|r| r.id).collect::<Vec<_>>(), ids);
}

#[rstest]
#[tokio::test]
async fn diffing_a_tree_against_itself_schedules_nothing(ctx: Ctx) {
    let materializer = ctx.materializer(5);
    let tree = blog_tree();
    assert!(materializer.reconcile(Some(&tree), &tree).is_empty());

    let records = vec![
        Record::new(RecordId::new(1), "A", "/a"),
        Record::new(RecordId::new(2), "B", "/b").with_parent(RecordId::new(1)),
    ];
    let built = build_navigation_tree(&records);
    ctx.store.set_mapping(ctx.query, built.mapping);
    assert!(materializer.reconcile(None, &built.root).is_empty());

    materializer.settled().await;
    assert!(ctx.backend.created_ids().is_empty());
}

#[rstest]
#[tokio::test]
async fn repeated_diffs_before_completion_create_once(ctx: Ctx) {
    let materializer = ctx.materializer(1);
    let first = blog_tree();
    let mut second = first.clone();
    second.push_child(Node::link("Contact", "/contact"));

    let a = materializer.reconcile(None, &first);
    let b = materializer.reconcile(None, &second);
    let c = materializer.reconcile(None, &second);
    assert_eq!((a.len(), b.len(), c.len()), (3, 1, 0));
    assert_eq!(b[0].local_id, *second.children()[2].local_id());

    materializer.settled().await;
    assert_eq!(ctx.backend.created_ids().len(), 4);
}

#[tokio::test]
async fn reset_discards_pending_creations_and_skips_late_mappings() {
    let ctx = Ctx::with_backend(MemoryBackend::new().with_create_delay(Duration::from_millis(20)));
    let materializer = ctx.materializer(1);
    let tree = blog_tree();

    let scheduled = materializer.reconcile(None, &tree);
    tokio::task::yield_now().await;
    materializer.reset();

    let mut results = Vec::new();
    for creation in scheduled {
        results.push(creation.handle.join().await);
    }

    assert_eq!(results[0], Ok(Ok(RecordId::new(1))));
    assert_eq!(results[1], Err(QueueError::Abandoned));
    assert_eq!(results[2], Err(QueueError::Abandoned));
    assert!(ctx.store.mapping(&ctx.query).is_empty());
    assert_eq!(ctx.store.records(&ctx.query), None);
    assert_eq!(ctx.backend.created_ids(), [RecordId::new(1)]);

    let retried = materializer.reconcile(None, &tree);
    assert_eq!(retried.len(), 3);
    materializer.settled().await;
    assert_eq!(ctx.store.mapping(&ctx.query).len(), 3);
}

#[rstest]
#[tokio::test]
async fn failed_creation_can_be_retried(ctx: Ctx) {
    let materializer = ctx.materializer(2);
    let tree = flat_links(1);
    let node = tree.children()[0].local_id().clone();
    ctx.backend.fail_next_creates(1);

    let mut scheduled = materializer.reconcile(None, &tree);
    let failed = scheduled.remove(0).handle.join().await.unwrap();
    assert!(failed.is_err());
    assert!(!materializer.is_requested(&node));
    assert_eq!(ctx.store.record_id_for(&ctx.query, &node), None);

    let mut retried = materializer.reconcile(None, &tree);
    assert_eq!(retried.len(), 1);
    let id = retried.remove(0).handle.join().await.unwrap().unwrap();
    assert_eq!(ctx.store.record_id_for(&ctx.query, &node), Some(id));
}

#[rstest]
#[case(1, 8)]
#[case(2, 8)]
#[case(5, 12)]
#[tokio::test]
async fn creation_calls_stay_within_the_limit(#[case] limit: usize, #[case] nodes: usize) {
    let ctx = Ctx::with_backend(MemoryBackend::new().with_create_delay(Duration::from_millis(2)));
    let materializer = ctx.materializer(limit);

    let scheduled = materializer.reconcile(None, &flat_links(nodes));
    assert_eq!(scheduled.len(), nodes);
    materializer.settled().await;

    assert_eq!(ctx.backend.max_concurrent_creates(), limit);
    assert_eq!(ctx.store.mapping(&ctx.query).len(), nodes);
}

#[tokio::test]
async fn menus_do_not_share_creation_state() {
    let backend = Arc::new(MemoryBackend::new());
    let store = Arc::new(EditorStore::new());
    let menu = |id| {
        Materializer::new(
            MenuQuery::new(MenuId::new(id)),
            backend.clone(),
            store.clone(),
            PlaceholderItem::default(),
            2,
        )
    };
    let (one, two) = (menu(1), menu(2));
    let tree = flat_links(2);

    one.reconcile(None, &tree);
    two.reset();
    let on_two = two.reconcile(None, &tree);
    assert_eq!(on_two.len(), 2);

    one.settled().await;
    two.settled().await;
    assert_eq!(store.mapping(&one.query()).len(), 2);
    assert_eq!(store.mapping(&two.query()).len(), 2);
    assert_eq!(backend.created_ids().len(), 4);
}
