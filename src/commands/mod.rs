//! CLI command implementations
//!
//! Each command wires the pipeline components together and subscribes
//! to the notifier for per-source progress; the pipeline itself never
//! prints.

pub mod free;
pub mod import;
pub mod list;
pub mod update;

use tokio::task::JoinHandle;

use crate::notify::{AggregationEvent, Notifier, SourceOutcome};

// Re-export command functions for convenience
pub use free::{free, list_free};
pub use import::{import_file, import_link, import_url};
pub use list::{list, purge, sub_add, sub_list, sub_remove, sub_set_enabled};
pub use update::update;

/// Render aggregation events to stdout until the run completes
pub(crate) fn print_events(notifier: &Notifier) -> JoinHandle<()> {
    let mut rx = notifier.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                AggregationEvent::Source(e) => match e.outcome {
                    SourceOutcome::Imported { count } => {
                        println!("  \"{}\": imported {count} server(s)", e.label);
                    }
                    SourceOutcome::Failed { reason } => {
                        println!("  \"{}\": failed ({reason})", e.label);
                    }
                },
                AggregationEvent::Completed { .. } => break,
            }
        }
    })
}
