//! Vitrine sync bus.
//!
//! - [`SyncBus`]: in-process registry of async listeners, optionally scoped
//!   to one form, with prioritized concurrent delivery and a bounded event
//!   history.
//! - [`SyncEvent`]: the entry change notification.

pub mod bus;
pub mod event;

pub use bus::{BusStats, EmitReport, ListenerError, ListenerFailure, ListenerSpec, Subscription, SyncBus};
pub use event::{SyncEvent, SyncEventKind};
