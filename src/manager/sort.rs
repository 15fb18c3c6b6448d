// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dependency Ordering of Pending Changes
//!
//! Each pending change is a node. If change `i`'s handler declares a
//! dependency pattern equal to change `j`'s handler pattern, the edge
//! `j → i` says `j` must be applied first. Kahn's algorithm, seeded in
//! pending order, yields a stable order; any node left over sits on a cycle.

use std::collections::VecDeque;

use crate::errors::{ConfigError, ConfigResult};
use crate::handler::{HandlerContext, HandlerRegistry};

/// Kahn's algorithm over `n` nodes; `(from, to)` means `from` precedes `to`
///
/// Returns the order, or the nodes that could not be ordered.
pub fn topological_order(n: usize, edges: &[(usize, usize)]) -> Result<Vec<usize>, Vec<usize>> {
    let mut in_degree = vec![0usize; n];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(from, to) in edges {
        if from >= n || to >= n {
            continue;
        }
        successors[from].push(to);
        in_degree[to] += 1;
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&node| in_degree[node] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &next in &successors[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() < n {
        Err((0..n).filter(|&node| in_degree[node] > 0).collect())
    } else {
        Ok(order)
    }
}

/// Edges between pending changes implied by handler dependencies
pub fn dependency_edges(
    registry: &HandlerRegistry,
    pending: &[HandlerContext],
) -> ConfigResult<Vec<(usize, usize)>> {
    let handlers = pending
        .iter()
        .map(|ctx| registry.get_handler(&ctx.path))
        .collect::<Result<Vec<_>, _>>()?;

    let mut edges = Vec::new();
    for (i, handler) in handlers.iter().enumerate() {
        for dependency in handler.dependencies() {
            for (j, other) in handlers.iter().enumerate() {
                if i != j && other.pattern().as_str() == dependency.as_str() {
                    edges.push((j, i));
                }
            }
        }
    }
    Ok(edges)
}

/// Indices of `pending` in apply order
pub fn dependency_order(
    registry: &HandlerRegistry,
    pending: &[HandlerContext],
) -> ConfigResult<Vec<usize>> {
    let edges = dependency_edges(registry, pending)?;
    topological_order(pending.len(), &edges).map_err(|stuck| {
        let paths: Vec<String> = stuck.iter().map(|&i| pending[i].path.clone()).collect();
        tracing::warn!(?paths, "circular dependency among pending changes");
        ConfigError::CircularDependency { paths }
    })
}
