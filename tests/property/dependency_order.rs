// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Dependency Ordering
//!
//! For any acyclic dependency graph the apply order is a valid topological
//! order covering every change. Any cycle rejects the commit before a single
//! change is applied.

use bng_config::manager::sort::topological_order;
use bng_config::{Config, ConfigError, Handler};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

use crate::fixtures::{manager_with, Journal, RecordingHandler};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// `n` nodes and edges that only point from lower to higher rank, with ranks
/// shuffled over node ids
fn acyclic_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| {
        let ranks = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
        let pairs = prop::collection::vec((0..n, 0..n), 0..(n * 2));
        (Just(n), ranks, pairs).prop_map(|(n, ranks, pairs)| {
            let mut edges: Vec<(usize, usize)> = pairs
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.min(b), a.max(b)))
                .map(|(lo, hi)| (ranks[lo], ranks[hi]))
                .collect();
            edges.sort();
            edges.dedup();
            (n, edges)
        })
    })
}

fn is_valid_order(order: &[usize], n: usize, edges: &[(usize, usize)]) -> bool {
    let mut position = vec![usize::MAX; n];
    for (i, &node) in order.iter().enumerate() {
        position[node] = i;
    }
    order.len() == n
        && position.iter().all(|&p| p != usize::MAX)
        && edges.iter().all(|&(from, to)| position[from] < position[to])
}

fn vrf_path(i: usize) -> String {
    format!("vrfs.v{}", i)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: acyclic graphs sort into a complete, valid order
    #[test]
    fn prop_acyclic_graphs_sort((n, edges) in acyclic_graph()) {
        let order = topological_order(n, &edges).unwrap();
        prop_assert!(is_valid_order(&order, n, &edges), "invalid order {:?} for {:?}", order, edges);
    }

    /// Property: reversing any edge of a path closes a cycle that is detected
    #[test]
    fn prop_back_edge_is_detected((n, mut edges) in acyclic_graph(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!edges.is_empty());
        let (from, to) = edges[pick.index(edges.len())];
        edges.push((to, from));

        let stuck = topological_order(n, &edges).unwrap_err();
        prop_assert!(stuck.contains(&from));
        prop_assert!(stuck.contains(&to));
    }

    /// Property: commits apply changes in a dependency-respecting order
    #[test]
    fn prop_commit_respects_dependencies((n, edges) in acyclic_graph(), rotation in 0usize..12) {
        let journal = Journal::new();
        let handlers: Vec<Arc<dyn Handler>> = (0..n)
            .map(|i| {
                edges
                    .iter()
                    .filter(|&&(_, to)| to == i)
                    .fold(RecordingHandler::new(&vrf_path(i), &journal), |h, &(from, _)| {
                        h.depends_on(&vrf_path(from))
                    })
                    .shared()
            })
            .collect();
        let (manager, _) = manager_with(handlers);

        // stage in a rotated order so pending order differs from node ids
        let offset = rotation % n;
        let applied = tokio_test::block_on(async {
            let id = manager.create_candidate_session().await;
            for k in 0..n {
                let i = (k + offset) % n;
                manager.set(&id, &vrf_path(i), json!({"table-id": i + 1})).await.unwrap();
            }
            manager.commit(&id).await.unwrap();
            journal.calls("apply")
        });

        let order: Vec<usize> = applied
            .iter()
            .map(|p| p.trim_start_matches("vrfs.v").parse().unwrap())
            .collect();
        prop_assert!(is_valid_order(&order, n, &edges), "applied {:?} for {:?}", order, edges);
    }

    /// Property: a dependency cycle leaves running configuration unchanged
    #[test]
    fn prop_commit_rejects_cycles(len in 2usize..6) {
        let journal = Journal::new();
        let handlers: Vec<Arc<dyn Handler>> = (0..len)
            .map(|i| {
                RecordingHandler::new(&vrf_path(i), &journal)
                    .depends_on(&vrf_path((i + 1) % len))
                    .shared()
            })
            .collect();
        let (manager, _) = manager_with(handlers);

        let (result, running) = tokio_test::block_on(async {
            let id = manager.create_candidate_session().await;
            for i in 0..len {
                manager.set(&id, &vrf_path(i), json!({"table-id": 1})).await.unwrap();
            }
            let result = manager.commit(&id).await;
            (result, manager.get_running().await)
        });

        let is_cycle = matches!(result, Err(ConfigError::CircularDependency { ref paths }) if paths.len() == len);
        prop_assert!(is_cycle);
        prop_assert!(journal.calls("apply").is_empty());
        prop_assert_eq!(running, Config::default());
    }
}
