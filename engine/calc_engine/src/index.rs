//! Reverse dependency index.

use crate::SettingId;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use tracing::trace;

/// Reverse map from datasource name to the settings that depend on it,
/// with a forward map alongside so deregistration never scans.
///
/// Invariant: bidirectional consistency - `id` appears in the bucket for
/// `name` exactly when `name` appears in `id`'s forward set. Both maps are
/// updated inside each method, and every method runs to completion on the
/// engine thread, so observers never see a half-updated index.
#[derive(Debug, Default)]
pub struct DependencyIndex {
    dependents: FxHashMap<String, BTreeSet<SettingId>>,
    forward: FxHashMap<SettingId, BTreeSet<String>>,
}

impl DependencyIndex {
    pub fn new() -> Self {
        DependencyIndex {
            dependents: FxHashMap::default(),
            forward: FxHashMap::default(),
        }
    }

    /// Register a setting's dependency set, replacing any prior
    /// registration for the same setting (idempotent).
    pub fn register(&mut self, id: SettingId, deps: BTreeSet<String>) {
        self.unregister(id);
        trace!(?id, ?deps, "registering dependencies");
        for name in &deps {
            self.dependents.entry(name.clone()).or_default().insert(id);
        }
        if !deps.is_empty() {
            self.forward.insert(id, deps);
        }
    }

    /// Remove a setting from every bucket it appears in. Buckets that
    /// become empty are dropped.
    pub fn unregister(&mut self, id: SettingId) {
        let Some(deps) = self.forward.remove(&id) else {
            return;
        };
        for name in &deps {
            if let Some(bucket) = self.dependents.get_mut(name) {
                bucket.remove(&id);
                if bucket.is_empty() {
                    self.dependents.remove(name);
                }
            }
        }
    }

    /// The settings that depend on a datasource, in deterministic order.
    pub fn dependents_of(&self, name: &str) -> impl Iterator<Item = SettingId> + '_ {
        self.dependents
            .get(name)
            .into_iter()
            .flat_map(|bucket| bucket.iter().copied())
    }

    /// Snapshot of the dependents set, for iteration that must survive
    /// re-registration mid-walk.
    pub fn dependents_snapshot(&self, name: &str) -> Vec<SettingId> {
        self.dependents_of(name).collect()
    }

    /// The registered dependency set of one setting.
    pub fn dependencies_of(&self, id: SettingId) -> Option<&BTreeSet<String>> {
        self.forward.get(&id)
    }

    /// Number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.dependents.len()
    }

    /// True if no setting is registered.
    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty() && self.forward.is_empty()
    }
}
