//! Setting storage.
//!
//! Settings live in a generational arena: a `SettingId` is an index plus a
//! generation, so a handle to a destroyed setting can never accidentally
//! address its slot's next tenant. This is what lets the scheduler hold
//! ids across sink callbacks that may delete settings.

use calc_ir::{ExpectedType, Value};
use calc_parse::CompiledUnit;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Identity of the widget or datasource instance that owns a setting.
/// Assigned by the surrounding dashboard model; opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub u64);

/// Stable handle to a registered setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingId {
    index: u32,
    generation: u32,
}

#[cfg(test)]
impl SettingId {
    /// Construct a handle directly, for index unit tests.
    pub(crate) fn from_raw(index: u32, generation: u32) -> Self {
        SettingId { index, generation }
    }
}

/// One registered setting's full state.
#[derive(Debug, Clone)]
pub(crate) struct SettingState {
    pub owner: OwnerId,
    pub name: String,
    pub raw_text: String,
    pub expected_type: ExpectedType,
    pub unit: CompiledUnit,
    pub dependencies: BTreeSet<String>,
    /// Most recent successful, defined result. Retained across transient
    /// evaluation failures so the display never flickers to empty.
    pub last_good: Option<Value>,
}

struct Slot {
    generation: u32,
    state: Option<SettingState>,
}

/// Generational arena of settings, with an `(owner, name)` lookup table.
#[derive(Default)]
pub(crate) struct SettingArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_key: FxHashMap<(OwnerId, String), SettingId>,
}

impl SettingArena {
    pub fn new() -> Self {
        SettingArena {
            slots: Vec::new(),
            free: Vec::new(),
            by_key: FxHashMap::default(),
        }
    }

    /// Insert a new setting, returning its handle.
    ///
    /// Callers must have checked that `(owner, name)` is not yet present;
    /// replacement goes through the engine so the dependency index stays
    /// consistent.
    pub fn insert(&mut self, state: SettingState) -> SettingId {
        let key = (state.owner, state.name.clone());
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.state = Some(state);
            SettingId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 0,
                state: Some(state),
            });
            SettingId {
                index,
                generation: 0,
            }
        };
        self.by_key.insert(key, id);
        id
    }

    /// Remove a setting, bumping its slot's generation.
    pub fn remove(&mut self, id: SettingId) -> Option<SettingState> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let state = slot.state.take()?;
        slot.generation += 1;
        self.free.push(id.index);
        self.by_key.remove(&(state.owner, state.name.clone()));
        Some(state)
    }

    pub fn get(&self, id: SettingId) -> Option<&SettingState> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.state.as_ref()
    }

    pub fn get_mut(&mut self, id: SettingId) -> Option<&mut SettingState> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.state.as_mut()
    }

    /// Look up a setting by its owner and field name.
    pub fn lookup(&self, owner: OwnerId, name: &str) -> Option<SettingId> {
        // Keyed by owned strings; a transient allocation here is fine for
        // the engine's call rates
        self.by_key.get(&(owner, name.to_string())).copied()
    }

    /// All settings belonging to one owner.
    pub fn owned_by(&self, owner: OwnerId) -> Vec<SettingId> {
        self.by_key
            .iter()
            .filter(|((o, _), _)| *o == owner)
            .map(|(_, id)| *id)
            .collect()
    }

    /// True if the handle still addresses a live setting.
    pub fn contains(&self, id: SettingId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live settings.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }
}
