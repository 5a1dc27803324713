//! Aggregation coordinator: one concurrent task per source
//!
//! Each source is an independently scheduled unit of work: fetch the
//! payload, run it through the decoder chain, merge into the store.
//! Failures are caught at the task boundary and become per-source
//! failure events; one source can never block or corrupt a sibling.
//! Store writes are serialized by the store's internal lock while
//! fetch and decode proceed concurrently across sources.
//!
//! Per-source events fire as soon as that source resolves, independent
//! of the batch's overall progress; the coordinator additionally tracks
//! outstanding tasks and emits one `Completed` event when all resolve.

use std::sync::Arc;
use tokio::task::{JoinHandle, JoinSet};

use crate::catalog::{self, Source};
use crate::fetcher::Fetch;
use crate::importer::Importer;
use crate::models::ImportMode;
use crate::notify::{AggregationEvent, Notifier, SourceOutcome};
use crate::store::ServerStore;

/// Result of one aggregation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationSummary {
    /// Sources attempted (including those skipped pre-fetch)
    pub total: usize,
    /// Sources whose import resolved successfully
    pub succeeded: usize,
    /// Sources that failed validation, fetch, decode or merge
    pub failed: usize,
    /// Entries persisted across all sources
    pub inserted: usize,
}

/// Drives concurrent multi-source imports
#[derive(Clone)]
pub struct Aggregator {
    fetcher: Arc<dyn Fetch>,
    importer: Arc<Importer>,
    notifier: Notifier,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn Fetch>, store: Arc<ServerStore>, notifier: Notifier) -> Self {
        Self {
            fetcher,
            importer: Arc::new(Importer::new(store)),
            notifier,
        }
    }

    /// The notifier carrying this aggregator's event stream
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Import from a single source; identical per-source semantics to
    /// [`run`](Self::run), batch size one.
    pub async fn run_one(&self, source: Source) -> AggregationSummary {
        self.run(vec![source]).await
    }

    /// Import from all given sources concurrently.
    ///
    /// Sources whose URL fails the well-formedness check are skipped
    /// before any network call, with exactly one failure event each.
    /// The rest are fetched and imported in parallel, each under its
    /// own source id in replace mode (a refresh of that source's prior
    /// entries). Returns once every outstanding task has resolved.
    pub async fn run(&self, sources: Vec<Source>) -> AggregationSummary {
        let mut summary = AggregationSummary {
            total: sources.len(),
            ..Default::default()
        };

        let mut tasks: JoinSet<(bool, usize)> = JoinSet::new();

        for source in sources {
            // Pre-fetch well-formedness check; short-circuits the network
            let url = match catalog::validate_url(&source.url) {
                Ok(url) => url,
                Err(e) => {
                    self.notifier.source_resolved(
                        &source.id,
                        &source.label,
                        SourceOutcome::Failed {
                            reason: e.to_string(),
                        },
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            let fetcher = Arc::clone(&self.fetcher);
            let importer = Arc::clone(&self.importer);
            let notifier = self.notifier.clone();

            tasks.spawn(async move {
                let outcome = match fetcher.fetch(&url).await {
                    Ok(payload) => {
                        match importer.import_batch(&payload, &source.id, ImportMode::Replace) {
                            Ok(count) => SourceOutcome::Imported { count },
                            Err(e) => SourceOutcome::Failed {
                                reason: e.to_string(),
                            },
                        }
                    }
                    Err(e) => SourceOutcome::Failed {
                        reason: e.to_string(),
                    },
                };

                let resolved = match &outcome {
                    SourceOutcome::Imported { count } => {
                        notifier.reload();
                        (true, *count)
                    }
                    SourceOutcome::Failed { .. } => (false, 0),
                };

                notifier.source_resolved(&source.id, &source.label, outcome);
                resolved
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((true, count)) => {
                    summary.succeeded += 1;
                    summary.inserted += count;
                }
                Ok((false, _)) => summary.failed += 1,
                // A panicked task still counts as a failed source
                Err(e) => {
                    tracing::error!(error = %e, "source task panicked");
                    summary.failed += 1;
                }
            }
        }

        self.notifier.emit(AggregationEvent::Completed {
            total: summary.total,
            succeeded: summary.succeeded,
            failed: summary.failed,
        });

        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            inserted = summary.inserted,
            "aggregation run complete"
        );
        summary
    }

    /// Detached fire-and-forget variant of [`run`](Self::run); observers
    /// follow progress through the notifier's event stream.
    pub fn spawn(&self, sources: Vec<Source>) -> JoinHandle<AggregationSummary> {
        let aggregator = self.clone();
        tokio::spawn(async move { aggregator.run(sources).await })
    }
}
