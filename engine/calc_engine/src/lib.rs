//! Reactive calculated-value engine.
//!
//! The [`Engine`] ties the pipeline together: it owns the datasource
//! [`SnapshotStore`], the [`DependencyIndex`], and the setting arena, and
//! drives recomputation when a datasource updates.
//!
//! Everything runs to completion on one thread. The only re-entrancy in
//! the system is deliberate: a [`ValueSink`] callback receives `&mut
//! Engine` and may edit settings mid fan-out, which is why the scheduler
//! iterates over a copied dependents set and re-checks setting existence
//! before every step.

mod engine;
mod index;
mod settings;
mod sink;
mod snapshot;

pub use engine::Engine;
pub use index::DependencyIndex;
pub use settings::{OwnerId, SettingId};
pub use sink::{BufferSink, Notification, NullSink, ValueSink};
pub use snapshot::{SnapshotEntry, SnapshotStore};

#[cfg(test)]
mod tests;
