//! Refresh all enabled user subscriptions

use anyhow::Result;
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::catalog::SourceCatalog;
use crate::commands::print_events;
use crate::config::Config;
use crate::fetcher::HttpFetcher;
use crate::notify::Notifier;
use crate::store::ServerStore;

pub async fn update(config: Config) -> Result<()> {
    let store = Arc::new(ServerStore::open(&config.database.sqlite_path)?);
    let catalog = SourceCatalog::new(config.template.timezone);

    let subscriptions = store.subscriptions()?;
    let sources = catalog.user_sources(&subscriptions);

    if sources.is_empty() {
        println!("No enabled subscriptions to update");
        return Ok(());
    }

    println!("Updating {} subscription(s)...", sources.len());

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
