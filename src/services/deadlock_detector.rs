//! Wait-for graph construction and deadlock (cycle) detection.

use std::collections::{BTreeSet, HashSet};

use crate::domain::errors::{raise, LockRole, ParseWarning};
use crate::domain::models::{
    DeadlockAnalysis, DeadlockCycle, LockInfo, ThreadDump, ThreadId, ThreadInfo, ThreadState,
    WaitForGraph,
};

/// Build the `waiter -> owner` graph for a snapshot.
///
/// Only locks with an owner and at least one waiter produce edges. Self
/// waits are dropped silently; ids without a matching thread are dropped
/// with a [`ParseWarning::DanglingThreadReference`].
pub fn build_wait_for_graph(
    threads: &[ThreadInfo],
    locks: &[LockInfo],
    warnings: &mut Vec<ParseWarning>,
) -> WaitForGraph {
    let known: HashSet<ThreadId> = threads.iter().map(|t| t.id).collect();
    let mut graph = WaitForGraph::new();

    for lock in locks {
        let Some(owner) = lock.owner_thread_id else {
            continue;
        };
        if lock.waiting_thread_ids.is_empty() {
            continue;
        }
        if !known.contains(&owner) {
            raise(
                warnings,
                ParseWarning::DanglingThreadReference {
                    lock: lock.identity.clone(),
                    thread_id: owner,
                    role: LockRole::Owner,
                },
            );
            continue;
        }

        graph.add_node(owner);
        for &waiter in &lock.waiting_thread_ids {
            if waiter == owner {
                tracing::debug!(lock = %lock.identity, thread = waiter, "ignoring self wait");
                continue;
            }
            if !known.contains(&waiter) {
                raise(
                    warnings,
                    ParseWarning::DanglingThreadReference {
                        lock: lock.identity.clone(),
                        thread_id: waiter,
                        role: LockRole::Waiter,
                    },
                );
                continue;
            }
            graph.add_edge(waiter, owner, &lock.identity);
        }
    }

    graph
}

/// DFS frame: a node and the index of its next successor to visit.
struct Frame {
    node: ThreadId,
    successors: Vec<ThreadId>,
    next: usize,
}

impl Frame {
    fn new(graph: &WaitForGraph, node: ThreadId) -> Self {
        Self {
            node,
            successors: graph.successors(node).collect(),
            next: 0,
        }
    }
}

/// Find cycles in the wait-for graph.
///
/// Iterative depth-first search with a global visited set (each node is
/// entered once) and an on-path set; a back edge to a node on the current
/// path closes a cycle. Cycles are rotated to start at their smallest id and
/// reported once each. Runs in O(V + E) on any finite graph.
pub fn detect_deadlocks(graph: &WaitForGraph) -> Vec<DeadlockCycle> {
    let mut visited: HashSet<ThreadId> = HashSet::new();
    let mut on_path: HashSet<ThreadId> = HashSet::new();
    let mut path: Vec<ThreadId> = Vec::new();
    let mut seen: BTreeSet<Vec<ThreadId>> = BTreeSet::new();
    let mut cycles = Vec::new();

    for start in graph.nodes() {
        if !visited.insert(start) {
            continue;
        }
        on_path.insert(start);
        path.push(start);
        let mut stack = vec![Frame::new(graph, start)];

        while let Some(frame) = stack.last_mut() {
            if frame.next >= frame.successors.len() {
                on_path.remove(&frame.node);
                path.pop();
                stack.pop();
                continue;
            }

            let next = frame.successors[frame.next];
            frame.next += 1;

            if on_path.contains(&next) {
                if let Some(pos) = path.iter().position(|&id| id == next) {
                    let members = canonical_rotation(&path[pos..]);
                    if seen.insert(members.clone()) {
                        cycles.push(close_cycle(graph, members));
                    }
                }
            } else if visited.insert(next) {
                on_path.insert(next);
                path.push(next);
                stack.push(Frame::new(graph, next));
            }
        }
    }

    cycles
}

/// Rotate so the smallest id comes first, keeping edge direction.
fn canonical_rotation(members: &[ThreadId]) -> Vec<ThreadId> {
    let start = members
        .iter()
        .enumerate()
        .min_by_key(|&(_, id)| *id)
        .map_or(0, |(i, _)| i);
    members[start..]
        .iter()
        .chain(&members[..start])
        .copied()
        .collect()
}

fn close_cycle(graph: &WaitForGraph, mut members: Vec<ThreadId>) -> DeadlockCycle {
    if let Some(&first) = members.first() {
        members.push(first);
    }
    let locks = members
        .windows(2)
        .map(|pair| {
            graph
                .lock_between(pair[0], pair[1])
                .map(str::to_string)
                .unwrap_or_default()
        })
        .collect();
    DeadlockCycle {
        threads: members,
        locks,
    }
}

/// Full analysis of one parsed dump.
pub fn analyze_dump(
    dump: &ThreadDump,
    source_name: &str,
    warnings: &mut Vec<ParseWarning>,
) -> DeadlockAnalysis {
    let graph = build_wait_for_graph(&dump.threads, &dump.locks, warnings);
    let cycles = detect_deadlocks(&graph);

    if cycles.is_empty() {
        tracing::debug!(
            source = source_name,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "no deadlock"
        );
    } else {
        tracing::info!(source = source_name, cycles = cycles.len(), "deadlock detected");
    }

    let descriptions = cycles.iter().map(|c| c.describe(dump)).collect();

    DeadlockAnalysis {
        source_name: source_name.to_string(),
        timestamp: dump.timestamp.clone(),
        thread_count: dump.threads.len(),
        state_counts: dump.state_counts(),
        blocked_threads: dump
            .threads
            .iter()
            .filter(|t| t.state == ThreadState::Blocked)
            .count(),
        cycles,
        descriptions,
    }
}
