//! Thread-dump snapshot model, wait-for graph, and deadlock cycles.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Thread id, unique within one dump.
pub type ThreadId = i64;

/// JVM thread state as reported in a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadState {
    New,
    Runnable,
    Blocked,
    Waiting,
    TimedWaiting,
    Terminated,
}

impl ThreadState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Runnable => "RUNNABLE",
            Self::Blocked => "BLOCKED",
            Self::Waiting => "WAITING",
            Self::TimedWaiting => "TIMED_WAITING",
            Self::Terminated => "TERMINATED",
        }
    }

    /// States in which a thread can be part of a wait-for cycle.
    pub const fn is_stalled(self) -> bool {
        matches!(self, Self::Blocked | Self::Waiting | Self::TimedWaiting)
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadInfo {
    pub id: ThreadId,
    pub name: String,
    pub state: ThreadState,
    pub locks_held: BTreeSet<String>,
    pub locks_waiting: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    pub identity: String,
    pub owner_thread_id: Option<ThreadId>,
    pub waiting_thread_ids: BTreeSet<ThreadId>,
}

impl LockInfo {
    pub fn new(identity: impl Into<String>, owner_thread_id: Option<ThreadId>) -> Self {
        Self {
            identity: identity.into(),
            owner_thread_id,
            waiting_thread_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_waiters(mut self, waiters: impl IntoIterator<Item = ThreadId>) -> Self {
        self.waiting_thread_ids.extend(waiters);
        self
    }
}

/// A parsed thread-dump snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadDump {
    pub timestamp: Option<String>,
    pub threads: Vec<ThreadInfo>,
    pub locks: Vec<LockInfo>,
}

impl ThreadDump {
    pub fn thread(&self, id: ThreadId) -> Option<&ThreadInfo> {
        self.threads.iter().find(|t| t.id == id)
    }

    /// Thread name for display, falling back to the numeric id.
    pub fn thread_label(&self, id: ThreadId) -> String {
        self.thread(id)
            .map_or_else(|| format!("#{id}"), |t| format!("{} (#{id})", t.name))
    }

    /// Count of threads per state. States with no threads are omitted.
    pub fn state_counts(&self) -> BTreeMap<ThreadState, usize> {
        let mut counts = BTreeMap::new();
        for thread in &self.threads {
            *counts.entry(thread.state).or_insert(0) += 1;
        }
        counts
    }
}

/// Directed "waits for" graph over thread ids.
///
/// An edge `a -> b` means thread `a` waits on a lock held by `b`. Each edge
/// keeps the identities of the locks that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitForGraph {
    adjacency: BTreeMap<ThreadId, BTreeSet<ThreadId>>,
    edge_locks: BTreeMap<(ThreadId, ThreadId), BTreeSet<String>>,
}

impl WaitForGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: ThreadId) {
        self.adjacency.entry(id).or_default();
    }

    /// Add `waiter -> owner` via `lock`. Self loops are ignored.
    pub fn add_edge(&mut self, waiter: ThreadId, owner: ThreadId, lock: &str) {
        if waiter == owner {
            return;
        }
        self.add_node(owner);
        self.adjacency.entry(waiter).or_default().insert(owner);
        self.edge_locks
            .entry((waiter, owner))
            .or_default()
            .insert(lock.to_string());
    }

    pub fn nodes(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn successors(&self, id: ThreadId) -> impl Iterator<Item = ThreadId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    pub fn has_edge(&self, from: ThreadId, to: ThreadId) -> bool {
        self.adjacency.get(&from).is_some_and(|s| s.contains(&to))
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum()
    }

    /// Lexically first lock connecting `from -> to`.
    pub fn lock_between(&self, from: ThreadId, to: ThreadId) -> Option<&str> {
        self.edge_locks
            .get(&(from, to))
            .and_then(|locks| locks.first())
            .map(String::as_str)
    }
}

/// A closed cycle `[t0, t1, ..., t0]` in the wait-for graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockCycle {
    pub threads: Vec<ThreadId>,
    /// `locks[i]` connects `threads[i]` to `threads[i + 1]`
    pub locks: Vec<String>,
}

impl DeadlockCycle {
    pub fn contains(&self, id: ThreadId) -> bool {
        self.threads.contains(&id)
    }

    /// "A waits for L held by B" chain using names from `dump`.
    pub fn describe(&self, dump: &ThreadDump) -> String {
        self.threads
            .windows(2)
            .zip(&self.locks)
            .map(|(pair, lock)| {
                format!(
                    "{} waits for {lock} held by {}",
                    dump.thread_label(pair[0]),
                    dump.thread_label(pair[1])
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Result of analysing one thread dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockAnalysis {
    /// File name or label the dump came from
    pub source_name: String,
    pub timestamp: Option<String>,
    pub thread_count: usize,
    pub state_counts: BTreeMap<ThreadState, usize>,
    pub blocked_threads: usize,
    pub cycles: Vec<DeadlockCycle>,
    /// Human-readable chain per cycle, same order as `cycles`
    pub descriptions: Vec<String>,
}

impl DeadlockAnalysis {
    pub fn has_deadlock(&self) -> bool {
        !self.cycles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(id: ThreadId, name: &str, state: ThreadState) -> ThreadInfo {
        ThreadInfo {
            id,
            name: name.to_string(),
            state,
            locks_held: BTreeSet::new(),
            locks_waiting: BTreeSet::new(),
        }
    }

    #[test]
    fn graph_ignores_self_loops() {
        let mut graph = WaitForGraph::new();
        graph.add_edge(1, 1, "L");
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn graph_tracks_edge_locks() {
        let mut graph = WaitForGraph::new();
        graph.add_edge(1, 2, "lockB");
        graph.add_edge(1, 2, "lockA");
        assert!(graph.has_edge(1, 2));
        assert!(!graph.has_edge(2, 1));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.lock_between(1, 2), Some("lockA"));
        assert_eq!(graph.lock_between(2, 1), None);
    }

    #[test]
    fn cycle_members_and_description() {
        let dump = ThreadDump {
            timestamp: None,
            threads: vec![
                thread(1, "worker-1", ThreadState::Blocked),
                thread(2, "worker-2", ThreadState::Blocked),
            ],
            locks: vec![],
        };
        let cycle = DeadlockCycle {
            threads: vec![1, 2, 1],
            locks: vec!["LockX".into(), "LockY".into()],
        };
        assert!(cycle.contains(2));
        assert_eq!(
            cycle.describe(&dump),
            "worker-1 (#1) waits for LockX held by worker-2 (#2); \
             worker-2 (#2) waits for LockY held by worker-1 (#1)"
        );
    }

    #[test]
    fn state_counts_and_labels() {
        let dump = ThreadDump {
            timestamp: None,
            threads: vec![
                thread(1, "a", ThreadState::Blocked),
                thread(2, "b", ThreadState::Runnable),
                thread(3, "c", ThreadState::Blocked),
            ],
            locks: vec![],
        };
        let counts = dump.state_counts();
        assert_eq!(counts.get(&ThreadState::Blocked), Some(&2));
        assert_eq!(counts.get(&ThreadState::Waiting), None);
        assert_eq!(dump.thread_label(9), "#9");
        assert!(ThreadState::TimedWaiting.is_stalled());
        assert!(!ThreadState::Runnable.is_stalled());
    }
}
