//! Listing and maintenance of the stored collection

use anyhow::{bail, Result};

use crate::config::Config;
use crate::models::Subscription;
use crate::store::ServerStore;

/// Print stored servers, optionally filtered to one subscription
pub fn list(config: Config, subscription: Option<String>) -> Result<()> {
    let store = ServerStore::open(&config.database.sqlite_path)?;

    let servers = match subscription {
        Some(ref id) => store.servers_by_subscription(id)?,
        None => store.servers()?,
    };

    if servers.is_empty() {
        println!("No servers stored");
        return Ok(());
    }

    for record in &servers {
        let group = if record.config.subscription_id.is_empty() {
            "-".to_string()
        } else {
            record.config.subscription_id.clone()
        };
        println!(
            "{:<8} {:<40} {:>5}  [{}]  {}",
            record.config.protocol,
            record.config.address,
            record.config.port,
            group,
            record.config.remarks,
        );
    }
    println!("{} server(s)", servers.len());
    Ok(())
}

/// Remove servers: one subscription's, or everything with `--all`
pub fn purge(config: Config, subscription: Option<String>, all: bool) -> Result<()> {
    let store = ServerStore::open(&config.database.sqlite_path)?;

    let removed = match (subscription, all) {
        (Some(id), _) => store.remove_subscription_servers(&id)?,
        (None, true) => store.remove_all_servers()?,
        (None, false) => bail!("pass --subscription <ID> or --all"),
    };

    println!("Removed {removed} server(s)");
    Ok(())
}

/// Register a new subscription
pub fn sub_add(config: Config, remarks: &str, url: &str) -> Result<()> {
    let store = ServerStore::open(&config.database.sqlite_path)?;

    let sub = Subscription::new(remarks, url);
    store.add_subscription(&sub)?;

    println!("Added subscription {} ({})", sub.id, sub.remarks);
    Ok(())
}

/// Remove a subscription and all servers it owns
pub fn sub_remove(config: Config, id: &str) -> Result<()> {
    let store = ServerStore::open(&config.database.sqlite_path)?;

    if store.remove_subscription(id)? {
        println!("Removed subscription {id}");
    } else {
        bail!("no subscription with id {id}");
    }
    Ok(())
}

/// Print all subscriptions
pub fn sub_list(config: Config) -> Result<()> {
    let store = ServerStore::open(&config.database.sqlite_path)?;

    let subs = store.subscriptions()?;
    if subs.is_empty() {
        println!("No subscriptions");
        return Ok(());
    }

    for sub in &subs {
        let state = if sub.enabled { "enabled" } else { "disabled" };
        println!("{:<36} {:<10} {:<24} {}", sub.id, state, sub.remarks, sub.url);
    }
    Ok(())
}

/// Toggle a subscription on or off
pub fn sub_set_enabled(config: Config, id: &str, enabled: bool) -> Result<()> {
    let store = ServerStore::open(&config.database.sqlite_path)?;

    if store.set_subscription_enabled(id, enabled)? {
        println!(
            "Subscription {id} {}",
            if enabled { "enabled" } else { "disabled" }
        );
    } else {
        bail!("no subscription with id {id}");
    }
    Ok(())
}
