//! The engine proper: registration and the recompute scheduler.

use crate::settings::{SettingArena, SettingState};
use crate::{DependencyIndex, OwnerId, SettingId, SnapshotStore, ValueSink};
use calc_ir::{ExpectedType, Value};
use calc_parse::compile;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Owns the snapshot store, the setting arena, and the dependency index,
/// and drives selective recomputation.
///
/// Single-threaded by contract: every operation runs to completion, and
/// the only shared mutable structure (the index) is never observed
/// half-updated.
#[derive(Default)]
pub struct Engine {
    snapshot: SnapshotStore,
    settings: SettingArena,
    index: DependencyIndex,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            snapshot: SnapshotStore::new(),
            settings: SettingArena::new(),
            index: DependencyIndex::new(),
        }
    }

    // Registration

    /// Create or replace a setting.
    ///
    /// Compiles `raw_text`, re-extracts its dependency set, swaps the
    /// compiled unit wholesale, re-registers in the index, and evaluates
    /// immediately - widgets expect an initial value without waiting for
    /// the next datasource tick.
    pub fn upsert_setting(
        &mut self,
        owner: OwnerId,
        name: &str,
        raw_text: &str,
        expected_type: ExpectedType,
        sink: &mut dyn ValueSink,
    ) -> SettingId {
        let unit = compile(raw_text);
        let dependencies: BTreeSet<String> = unit.dependencies();

        let id = if let Some(id) = self.settings.lookup(owner, name) {
            if let Some(state) = self.settings.get_mut(id) {
                state.raw_text = raw_text.to_string();
                state.expected_type = expected_type;
                state.unit = unit;
                state.dependencies = dependencies.clone();
            }
            id
        } else {
            self.settings.insert(SettingState {
                owner,
                name: name.to_string(),
                raw_text: raw_text.to_string(),
                expected_type,
                unit,
                dependencies: dependencies.clone(),
                last_good: None,
            })
        };

        self.index.register(id, dependencies);
        self.recompute_one(id, sink);
        id
    }

    /// Destroy one setting, de-registering it from the index.
    ///
    /// Safe to call from a sink callback mid fan-out; the scheduler
    /// re-checks existence before touching each dependent.
    pub fn remove_setting(&mut self, owner: OwnerId, name: &str) -> bool {
        let Some(id) = self.settings.lookup(owner, name) else {
            return false;
        };
        self.index.unregister(id);
        self.settings.remove(id).is_some()
    }

    /// Destroy every setting belonging to an owner (widget deleted).
    pub fn remove_owner(&mut self, owner: OwnerId) -> usize {
        let ids = self.settings.owned_by(owner);
        let mut removed = 0;
        for id in ids {
            self.index.unregister(id);
            if self.settings.remove(id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    // Datasource events

    /// Ingest a fresh payload for a datasource and recompute its
    /// dependents.
    ///
    /// The dependents set is copied before iteration: sink callbacks may
    /// re-register or delete settings while the fan-out is in progress.
    pub fn update_datasource(&mut self, name: &str, payload: Value, sink: &mut dyn ValueSink) {
        let revision = self.snapshot.update(name, payload);
        let dependents = self.index.dependents_snapshot(name);
        debug!(
            datasource = name,
            revision,
            dependents = dependents.len(),
            "datasource updated"
        );
        for id in dependents {
            self.recompute_one(id, sink);
        }
    }

    /// Drop a datasource and recompute everything that referenced it
    /// (their references now resolve to absent).
    pub fn remove_datasource(&mut self, name: &str, sink: &mut dyn ValueSink) -> bool {
        let existed = self.snapshot.remove(name);
        if existed {
            let dependents = self.index.dependents_snapshot(name);
            debug!(
                datasource = name,
                dependents = dependents.len(),
                "datasource removed"
            );
            for id in dependents {
                self.recompute_one(id, sink);
            }
        }
        existed
    }

    // Accessors

    /// Read-only view of the current snapshot (the completion resolver
    /// works from this).
    pub fn snapshot(&self) -> &SnapshotStore {
        &self.snapshot
    }

    /// The dependency index, for inspection.
    pub fn index(&self) -> &DependencyIndex {
        &self.index
    }

    /// A setting's handle, if it exists.
    pub fn setting_id(&self, owner: OwnerId, name: &str) -> Option<SettingId> {
        self.settings.lookup(owner, name)
    }

    /// The most recent successful value of a setting.
    pub fn last_good(&self, owner: OwnerId, name: &str) -> Option<&Value> {
        self.settings
            .lookup(owner, name)
            .and_then(|id| self.settings.get(id))
            .and_then(|state| state.last_good.as_ref())
    }

    /// A setting's declared expected type.
    pub fn expected_type(&self, owner: OwnerId, name: &str) -> Option<ExpectedType> {
        self.settings
            .lookup(owner, name)
            .and_then(|id| self.settings.get(id))
            .map(|state| state.expected_type)
    }

    /// Whether a setting's latest value matches its expected type. `false`
    /// when nothing has ever evaluated successfully - the caller surfaces
    /// that as a validation hint near the input field.
    pub fn is_type_match(&self, owner: OwnerId, name: &str) -> bool {
        let Some(id) = self.settings.lookup(owner, name) else {
            return false;
        };
        let Some(state) = self.settings.get(id) else {
            return false;
        };
        state
            .last_good
            .as_ref()
            .is_some_and(|value| state.expected_type.matches(value))
    }

    /// Number of live settings.
    pub fn setting_count(&self) -> usize {
        self.settings.len()
    }

    // Recompute

    /// Re-evaluate one setting and deliver its value if it changed.
    ///
    /// Failure policy: an evaluation error or an `Undefined` result keeps
    /// the previous `last_good` and stays silent - transient datasource
    /// hiccups never blank a widget.
    fn recompute_one(&mut self, id: SettingId, sink: &mut dyn ValueSink) {
        // Existence check: the setting may have been destroyed by an
        // earlier callback in this same fan-out
        let Some(state) = self.settings.get(id) else {
            return;
        };
        let owner = state.owner;
        let name = state.name.clone();

        let result = calc_eval::evaluate_setting(&state.unit, &state.raw_text, &self.snapshot);

        match result {
            Ok(value) if !value.is_undefined() => {
                let changed = self
                    .settings
                    .get(id)
                    .is_some_and(|s| s.last_good.as_ref() != Some(&value));
                if !changed {
                    return;
                }
                if let Some(state) = self.settings.get_mut(id) {
                    state.last_good = Some(value.clone());
                }
                trace!(?owner, setting = %name, %value, "value changed");
                sink.value_changed(self, owner, &name, &value);
            }
            Ok(_) => {
                // Undefined: no data yet, nothing to report
                trace!(?owner, setting = %name, "evaluated to undefined; retaining last value");
            }
            Err(err) => {
                debug!(?owner, setting = %name, %err, "evaluation failed; retaining last value");
            }
        }
    }
}
