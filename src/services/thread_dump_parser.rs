//! Thread-dump JSON parsing.
//!
//! Expected document:
//!
//! ```json
//! {
//!   "timestamp": "2024-03-01T12:00:00Z",
//!   "threads": [
//!     {"id": 1, "name": "worker-1", "state": "BLOCKED",
//!      "locks_held": ["0xA"], "locks_waiting": ["0xB"]}
//!   ],
//!   "locks": [
//!     {"identity": "0xA", "owner_thread": 1, "waiting_threads": [2]}
//!   ]
//! }
//! ```
//!
//! `threads` is required; `timestamp`, `locks` and the per-thread lock lists
//! are optional. Locks only mentioned from the thread side are added to the
//! lock table so the wait-for graph sees them.

use std::collections::{btree_map::Entry, BTreeMap, HashSet};

use serde::Deserialize;

use crate::domain::errors::{DiagnosticError, DiagnosticResult};
use crate::domain::models::{LockInfo, ThreadDump, ThreadId, ThreadInfo, ThreadState};

#[derive(Debug, Deserialize)]
struct DumpDocument {
    #[serde(default)]
    timestamp: Option<String>,
    threads: Vec<WireThread>,
    #[serde(default)]
    locks: Vec<WireLock>,
}

#[derive(Debug, Deserialize)]
struct WireThread {
    id: ThreadId,
    name: String,
    state: ThreadState,
    #[serde(default)]
    locks_held: Vec<String>,
    #[serde(default)]
    locks_waiting: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireLock {
    identity: String,
    #[serde(default)]
    owner_thread: Option<ThreadId>,
    #[serde(default)]
    waiting_threads: Vec<ThreadId>,
}

/// Parse a thread-dump document.
///
/// `source_name` labels errors (usually the file name). A dump with no
/// threads is valid.
pub fn parse_dump(json: &str, source_name: &str) -> DiagnosticResult<ThreadDump> {
    let document: DumpDocument = serde_json::from_str(json)
        .map_err(|e| DiagnosticError::format(source_name, e.to_string()))?;

    let mut seen_threads = HashSet::new();
    let mut threads = Vec::with_capacity(document.threads.len());
    for wire in document.threads {
        if !seen_threads.insert(wire.id) {
            return Err(DiagnosticError::format(
                source_name,
                format!("duplicate thread id {}", wire.id),
            ));
        }
        threads.push(ThreadInfo {
            id: wire.id,
            name: wire.name,
            state: wire.state,
            locks_held: wire.locks_held.into_iter().collect(),
            locks_waiting: wire.locks_waiting.into_iter().collect(),
        });
    }

    let mut table: BTreeMap<String, LockInfo> = BTreeMap::new();
    // Keep the document's lock order for listed locks
    let mut order: Vec<String> = Vec::with_capacity(document.locks.len());
    for wire in document.locks {
        match table.entry(wire.identity.clone()) {
            Entry::Occupied(_) => {
                return Err(DiagnosticError::format(
                    source_name,
                    format!("duplicate lock identity {}", wire.identity),
                ));
            }
            Entry::Vacant(slot) => {
                order.push(wire.identity.clone());
                slot.insert(
                    LockInfo::new(wire.identity, wire.owner_thread)
                        .with_waiters(wire.waiting_threads),
                );
            }
        }
    }

    reconcile_thread_views(&threads, &mut table, &mut order);

    let locks = order
        .into_iter()
        .filter_map(|identity| table.remove(&identity))
        .collect();

    tracing::debug!(
        source = source_name,
        threads = threads.len(),
        "parsed thread dump"
    );

    Ok(ThreadDump {
        timestamp: document.timestamp,
        threads,
        locks,
    })
}

/// Fold each thread's own `locks_held` / `locks_waiting` into the table.
fn reconcile_thread_views(
    threads: &[ThreadInfo],
    table: &mut BTreeMap<String, LockInfo>,
    order: &mut Vec<String>,
) {
    for thread in threads {
        for identity in &thread.locks_held {
            let lock = table.entry(identity.clone()).or_insert_with(|| {
                order.push(identity.clone());
                LockInfo::new(identity.clone(), None)
            });
            match lock.owner_thread_id {
                None => lock.owner_thread_id = Some(thread.id),
                Some(owner) if owner != thread.id => tracing::debug!(
                    lock = %identity,
                    listed_owner = owner,
                    claimed_by = thread.id,
                    "lock table owner disagrees with thread view; keeping table"
                ),
                Some(_) => {}
            }
        }
        for identity in &thread.locks_waiting {
            table
                .entry(identity.clone())
                .or_insert_with(|| {
                    order.push(identity.clone());
                    LockInfo::new(identity.clone(), None)
                })
                .waiting_thread_ids
                .insert(thread.id);
        }
    }
}
