//! subsync - Proxy subscription aggregator
//!
//! Fetches proxy-server definitions from many independent remote
//! sources, decodes each payload into server entries, and merges them
//! into a persistent collection with deduplication, reporting
//! per-source outcomes without letting one failing source block others.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`catalog`] - Source catalog: user subscriptions and built-in free endpoints
//! - [`fetcher`] - HTTP payload retrieval, one isolated attempt per source
//! - [`decoder`] - Two-tier payload decoding with base64 transport fallback
//! - [`importer`] - Batch and single-entry import into the store
//! - [`store`] - Persistent SQLite server collection
//! - [`aggregator`] - Concurrent per-source orchestration
//! - [`notify`] - Structured outcome events and the store-reload signal
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and types
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use subsync::aggregator::Aggregator;
//! use subsync::catalog::SourceCatalog;
//! use subsync::config::Config;
//! use subsync::fetcher::HttpFetcher;
//! use subsync::notify::Notifier;
//! use subsync::store::ServerStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = Arc::new(ServerStore::open(&config.database.sqlite_path)?);
//!     let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
//!
//!     let catalog = SourceCatalog::new(config.template.timezone);
//!     let aggregator = Aggregator::new(fetcher, store, Notifier::new());
//!
//!     let summary = aggregator.run(catalog.builtin_sources()).await;
//!     println!("imported {} servers", summary.inserted);
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod decoder;
pub mod error;
pub mod fetcher;
pub mod importer;
pub mod models;
pub mod notify;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregator::{AggregationSummary, Aggregator};
    pub use crate::catalog::{Source, SourceCatalog};
    pub use crate::config::Config;
    pub use crate::decoder::DecoderChain;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::fetcher::{Fetch, HttpFetcher};
    pub use crate::importer::Importer;
    pub use crate::models::{ImportMode, Protocol, ServerConfig, Subscription};
    pub use crate::notify::{AggregationEvent, Notifier, SourceOutcome};
    pub use crate::store::ServerStore;
}

// Direct re-exports for convenience
pub use models::{ImportMode, Protocol, ServerConfig, Subscription};
