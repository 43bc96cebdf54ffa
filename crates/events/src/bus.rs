//! In-process sync bus: a registry of named async listeners.
//!
//! [`SyncBus`] is constructed explicitly and shared via `Arc<SyncBus>`.
//! Listeners may be scoped to one form; [`SyncBus::emit`] runs every
//! matching listener concurrently, highest priority first, and isolates
//! failures so a broken listener never affects the emitter or its siblings.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use serde::Serialize;
use vitrine_core::types::DbId;

use crate::event::SyncEvent;

/// Number of events kept by [`SyncBus::history`].
pub const HISTORY_LIMIT: usize = 100;

/// Error type listeners may return.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

type Callback = Arc<dyn Fn(SyncEvent) -> BoxFuture<'static, Result<(), ListenerError>> + Send + Sync>;

// ---------------------------------------------------------------------------
// Listener registration
// ---------------------------------------------------------------------------

/// Description of a listener to register.
pub struct ListenerSpec {
    id: String,
    form_id: Option<DbId>,
    priority: i32,
    callback: Callback,
}

impl ListenerSpec {
    /// A listener receiving every event, at priority 0.
    pub fn new<F, Fut>(id: impl Into<String>, callback: F) -> Self
    where
        F: Fn(SyncEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
    {
        Self {
            id: id.into(),
            form_id: None,
            priority: 0,
            callback: Arc::new(move |event| callback(event).boxed()),
        }
    }

    /// Only receive events of this form.
    pub fn for_form(mut self, form_id: DbId) -> Self {
        self.form_id = Some(form_id);
        self
    }

    /// Higher priorities start first.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

struct Registered {
    form_id: Option<DbId>,
    priority: i32,
    callback: Callback,
    token: u64,
}

impl Registered {
    fn matches(&self, event: &SyncEvent) -> bool {
        self.form_id.map_or(true, |id| id == event.form_id)
    }
}

#[derive(Default)]
struct Registry {
    listeners: HashMap<String, Registered>,
    history: VecDeque<SyncEvent>,
    next_token: u64,
    total_emitted: u64,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle returned by [`SyncBus::add_listener`]. Dropping it unregisters the
/// listener unless the id has since been re-registered.
#[must_use = "dropping the subscription unregisters the listener"]
pub struct Subscription {
    id: String,
    token: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Unregister now.
    pub fn unsubscribe(self) {}

    /// Keep the listener registered for the lifetime of the bus.
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if registry
            .listeners
            .get(&self.id)
            .is_some_and(|l| l.token == self.token)
        {
            registry.listeners.remove(&self.id);
            tracing::debug!(listener = %self.id, "Sync listener unsubscribed");
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// ---------------------------------------------------------------------------
// Emission results and diagnostics
// ---------------------------------------------------------------------------

/// Why a listener did not complete.
#[derive(Debug, thiserror::Error)]
pub enum ListenerFailure {
    #[error("listener returned an error: {0}")]
    Failed(ListenerError),

    #[error("listener panicked: {0}")]
    Panicked(String),
}

/// Outcome of one [`SyncBus::emit`] call.
#[derive(Debug, Default)]
pub struct EmitReport {
    /// Listeners that completed successfully.
    pub delivered: usize,
    /// Listeners that failed, by id.
    pub failures: Vec<(String, ListenerFailure)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerInfo {
    pub id: String,
    pub form_id: Option<DbId>,
    pub priority: i32,
}

/// Snapshot of the bus for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct BusStats {
    pub listener_count: usize,
    pub listeners: Vec<ListenerInfo>,
    pub history_size: usize,
    pub total_emitted: u64,
    pub last_event: Option<SyncEvent>,
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ---------------------------------------------------------------------------
// SyncBus
// ---------------------------------------------------------------------------

/// Fan-out of entry change events to registered listeners.
#[derive(Default)]
pub struct SyncBus {
    registry: Arc<Mutex<Registry>>,
}

impl SyncBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. An existing listener with the same id is replaced.
    pub fn add_listener(&self, spec: ListenerSpec) -> Subscription {
        let mut registry = lock(&self.registry);
        registry.next_token += 1;
        let token = registry.next_token;

        let replaced = registry
            .listeners
            .insert(
                spec.id.clone(),
                Registered {
                    form_id: spec.form_id,
                    priority: spec.priority,
                    callback: spec.callback,
                    token,
                },
            )
            .is_some();

        tracing::debug!(
            listener = %spec.id,
            form_id = ?spec.form_id,
            priority = spec.priority,
            replaced,
            "Sync listener registered"
        );

        Subscription {
            id: spec.id,
            token,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Unregister by id. Returns whether a listener was removed.
    pub fn remove_listener(&self, id: &str) -> bool {
        lock(&self.registry).listeners.remove(id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    /// Deliver an event to every matching listener and wait for all of them.
    ///
    /// Listeners start in descending priority order and run concurrently.
    /// Errors and panics are logged and reported, never propagated.
    pub async fn emit(&self, event: SyncEvent) -> EmitReport {
        let mut targets: Vec<(String, i32, Callback)> = {
            let mut registry = lock(&self.registry);
            if registry.history.len() == HISTORY_LIMIT {
                registry.history.pop_front();
            }
            registry.history.push_back(event.clone());
            registry.total_emitted += 1;

            registry
                .listeners
                .iter()
                .filter(|(_, l)| l.matches(&event))
                .map(|(id, l)| (id.clone(), l.priority, Arc::clone(&l.callback)))
                .collect()
        };
        targets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        tracing::debug!(
            kind = %event.kind,
            entry_id = %event.entry_id,
            form_id = %event.form_id,
            listeners = targets.len(),
            "Emitting sync event"
        );

        let runs = targets.into_iter().map(|(id, _, callback)| {
            let event = event.clone();
            async move {
                let outcome = AssertUnwindSafe(async move { callback(event).await })
                    .catch_unwind()
                    .await;
                (id, outcome)
            }
        });

        let mut report = EmitReport::default();
        for (id, outcome) in join_all(runs).await {
            let failure = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(err)) => ListenerFailure::Failed(err),
                Err(payload) => ListenerFailure::Panicked(panic_message(payload)),
            };
            tracing::warn!(listener = %id, error = %failure, "Sync listener failed");
            report.failures.push((id, failure));
        }
        report
    }

    /// Most recent events, oldest first.
    pub fn history(&self) -> Vec<SyncEvent> {
        lock(&self.registry).history.iter().cloned().collect()
    }

    pub fn stats(&self) -> BusStats {
        let registry = lock(&self.registry);
        let mut listeners: Vec<ListenerInfo> = registry
            .listeners
            .iter()
            .map(|(id, l)| ListenerInfo {
                id: id.clone(),
                form_id: l.form_id,
                priority: l.priority,
            })
            .collect();
        listeners.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

        BusStats {
            listener_count: listeners.len(),
            listeners,
            history_size: registry.history.len(),
            total_emitted: registry.total_emitted,
            last_event: registry.history.back().cloned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
