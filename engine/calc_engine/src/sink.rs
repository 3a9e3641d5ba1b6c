//! The value-changed notification seam.

use crate::{Engine, OwnerId};
use calc_ir::Value;

/// Receiver for computed setting values - the widget subsystem's side of
/// the contract.
///
/// The callback gets `&mut Engine` so it may edit settings, push payloads,
/// or delete its own owner while a recompute is in flight; the scheduler
/// is written to survive that (it iterates a copied dependents set and
/// re-checks existence before touching each setting).
pub trait ValueSink {
    /// A setting's value changed (or was computed for the first time).
    fn value_changed(
        &mut self,
        engine: &mut Engine,
        owner: OwnerId,
        setting_name: &str,
        value: &Value,
    );
}

/// Sink that discards notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ValueSink for NullSink {
    fn value_changed(&mut self, _: &mut Engine, _: OwnerId, _: &str, _: &Value) {}
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub owner: OwnerId,
    pub setting_name: String,
    pub value: Value,
}

/// Sink that records every notification, for tests and debugging.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub notifications: Vec<Notification>,
}

impl BufferSink {
    pub fn new() -> Self {
        BufferSink {
            notifications: Vec::new(),
        }
    }

    /// Values delivered so far, in order.
    pub fn values(&self) -> Vec<&Value> {
        self.notifications.iter().map(|n| &n.value).collect()
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
    }
}

impl ValueSink for BufferSink {
    fn value_changed(
        &mut self,
        _engine: &mut Engine,
        owner: OwnerId,
        setting_name: &str,
        value: &Value,
    ) {
        self.notifications.push(Notification {
            owner,
            setting_name: setting_name.to_string(),
            value: value.clone(),
        });
    }
}
