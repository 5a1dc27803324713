//! Import from the built-in free endpoints

use anyhow::{bail, Result};
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::catalog::SourceCatalog;
use crate::commands::print_events;
use crate::config::Config;
use crate::fetcher::HttpFetcher;
use crate::notify::Notifier;
use crate::store::ServerStore;

/// Fetch one built-in endpoint by id, or the whole fixed list
pub async fn free(config: Config, id: Option<String>) -> Result<()> {
    let store = Arc::new(ServerStore::open(&config.database.sqlite_path)?);
    let catalog = SourceCatalog::new(config.template.timezone);

    let sources = match id {
        Some(ref id) => match catalog.builtin_source(id) {
            Some(source) => vec![source],
            None => bail!(
                "unknown built-in source '{id}' (see `subsync free --list`)"
            ),
        },
        None => catalog.builtin_sources(),
    };

    println!("Fetching {} free endpoint(s)...", sources.len());

    let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
    let aggregator = Aggregator::new(fetcher, store, Notifier::new());

    let printer = print_events(aggregator.notifier());
    let summary = aggregator.run(sources).await;
    printer.await?;

    println!(
        "Done: {} succeeded, {} failed, {} servers imported",
        summary.succeeded, summary.failed, summary.inserted
    );
    Ok(())
}

/// Print the built-in source table
pub fn list_free(config: Config) -> Result<()> {
    let catalog = SourceCatalog::new(config.template.timezone);

    for source in catalog.builtin_sources() {
        println!("{:<24} {:<32} {}", source.id, source.label, source.url);
    }
    Ok(())
}
