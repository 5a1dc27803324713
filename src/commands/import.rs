//! Manual imports: single link, local file, or remote URL

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog;
use crate::config::Config;
use crate::fetcher::{Fetch, HttpFetcher};
use crate::importer::Importer;
use crate::models::ImportMode;
use crate::store::ServerStore;

/// Import a single share link (the clipboard/QR path)
///
/// Bypasses the batch decoder; malformed input is reported with its
/// cause rather than as a generic import failure.
pub fn import_link(config: Config, link: &str, subscription: Option<String>) -> Result<()> {
    let store = Arc::new(ServerStore::open(&config.database.sqlite_path)?);
    let importer = Importer::new(store);

    let subscription_id = subscription.unwrap_or_default();
    let count = importer
        .import_single(link, &subscription_id)
        .context("malformed server link")?;

    if count > 0 {
        println!("Imported 1 server");
    } else {
        println!("Server already present, nothing imported");
    }
    Ok(())
}

/// Batch-import a payload from a local file
pub fn import_file(config: Config, path: PathBuf, subscription: Option<String>) -> Result<()> {
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_payload(config, &raw, subscription)
}

/// Batch-import a payload fetched from a URL
pub async fn import_url(config: Config, url: &str, subscription: Option<String>) -> Result<()> {
    let url = catalog::validate_url(url)?;

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let raw = fetcher.fetch(&url).await?;

    import_payload(config, &raw, subscription)
}

fn import_payload(config: Config, raw: &str, subscription: Option<String>) -> Result<()> {
    if raw.trim().is_empty() {
        bail!("payload is empty");
    }

    let store = Arc::new(ServerStore::open(&config.database.sqlite_path)?);
    let importer = Importer::new(store);

    // Manual imports append; only a named subscription refresh replaces
    let subscription_id = subscription.unwrap_or_default();
    let count = importer.import_batch(raw, &subscription_id, ImportMode::Append)?;

    println!("Imported {count} server(s)");
    Ok(())
}
