//! Structured outcome events and the store-reload signal
//!
//! The import pipeline never renders anything itself: each source's
//! resolution is published as a structured event on a broadcast
//! channel, and a presentation layer (the CLI, a UI, a test) subscribes
//! and decides how to surface it. Completion of a store-changing import
//! additionally bumps the reload signal so observers can refresh their
//! view of the server list.

use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// How one source's import attempt resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Entries persisted (may be zero when everything was a duplicate)
    Imported { count: usize },
    /// Fetch, decode or merge failed
    Failed { reason: String },
}

impl SourceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Imported { .. })
    }
}

/// Outcome event for a single source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEvent {
    pub source_id: String,
    pub label: String,
    pub outcome: SourceOutcome,
}

/// Event stream emitted during an aggregation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationEvent {
    /// One source resolved (emitted in completion order)
    Source(SourceEvent),
    /// All outstanding per-source tasks resolved
    Completed {
        total: usize,
        succeeded: usize,
        failed: usize,
    },
}

/// Idempotent store-reload signal
///
/// Triggers while no observer is looking coalesce into one generation
/// bump, so firing it once per source as many sources complete
/// near-simultaneously is safe.
#[derive(Clone)]
pub struct ReloadSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl ReloadSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Request a reload
    pub fn trigger(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }

    /// Observe reload requests; `changed().await` wakes on the next
    /// trigger regardless of how many fired in between.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Current generation (mainly useful in tests)
    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for ReloadSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes aggregation events to any number of subscribers
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<AggregationEvent>,
    reload: ReloadSignal,
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self {
            tx,
            reload: ReloadSignal::new(),
        }
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<AggregationEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; having no subscribers is not an error
    pub fn emit(&self, event: AggregationEvent) {
        if let AggregationEvent::Source(ref e) = event {
            match &e.outcome {
                SourceOutcome::Imported { count } => {
                    tracing::info!(source = %e.label, count, "source imported");
                }
                SourceOutcome::Failed { reason } => {
                    tracing::warn!(source = %e.label, reason = %reason, "source failed");
                }
            }
        }
        let _ = self.tx.send(event);
    }

    /// Publish one source's outcome
    pub fn source_resolved(&self, source_id: &str, label: &str, outcome: SourceOutcome) {
        self.emit(AggregationEvent::Source(SourceEvent {
            source_id: source_id.to_string(),
            label: label.to_string(),
            outcome,
        }));
    }

    /// The shared reload signal
    pub fn reload_signal(&self) -> &ReloadSignal {
        &self.reload
    }

    /// Request a store reload
    pub fn reload(&self) {
        self.reload.trigger();
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
