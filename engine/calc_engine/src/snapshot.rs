//! Datasource snapshot store.

use calc_eval::DatasourceView;
use calc_ir::Value;
use indexmap::IndexMap;

/// The latest payload for one datasource.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    /// Most recently received payload.
    pub payload: Value,
    /// Count of updates received. Diagnostics only - the engine derives no
    /// ordering guarantees from it.
    pub revision: u64,
}

/// Per-datasource latest payloads, insertion-ordered.
///
/// Insertion order is the order datasources were first seen in, which is
/// the order the completion resolver lists them in.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    entries: IndexMap<String, SnapshotEntry>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        SnapshotStore {
            entries: IndexMap::new(),
        }
    }

    /// Store a fresh payload, returning the new revision.
    pub fn update(&mut self, name: &str, payload: Value) -> u64 {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.payload = payload;
            entry.revision += 1;
            entry.revision
        } else {
            self.entries
                .insert(name.to_string(), SnapshotEntry { payload, revision: 1 });
            1
        }
    }

    /// Drop a datasource entirely. Returns true if it existed.
    ///
    /// Uses shift-removal so the remaining entries keep their creation
    /// order.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.shift_remove(name).is_some()
    }

    /// The latest payload for a datasource.
    pub fn payload(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|e| &e.payload)
    }

    /// The revision counter for a datasource.
    pub fn revision(&self, name: &str) -> Option<u64> {
        self.entries.get(name).map(|e| e.revision)
    }

    /// True if the datasource has ever reported data.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Datasource names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DatasourceView for SnapshotStore {
    fn payload(&self, name: &str) -> Option<&Value> {
        SnapshotStore::payload(self, name)
    }
}
