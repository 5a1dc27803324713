use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subsync::commands;
use subsync::config::Config;

#[derive(Parser)]
#[command(
    name = "subsync",
    version,
    about = "Proxy subscription aggregator with concurrent multi-source import",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); falls back to environment variables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh all enabled user subscriptions
    Update,

    /// Import from the built-in free endpoints
    Free {
        /// Fetch a single built-in source by id
        #[arg(long)]
        id: Option<String>,

        /// List the built-in sources instead of fetching
        #[arg(long, default_value = "false")]
        list: bool,
    },

    /// Import servers manually
    Import {
        /// A single share link (vmess://, vless://, trojan://, ss://, socks://)
        link: Option<String>,

        /// Batch-import a payload from a local file
        #[arg(short, long, conflicts_with = "link")]
        file: Option<PathBuf>,

        /// Batch-import a payload fetched from a URL
        #[arg(short, long, conflicts_with_all = ["link", "file"])]
        url: Option<String>,

        /// Subscription id to group the imported servers under
        #[arg(short, long)]
        subscription: Option<String>,
    },

    /// Show stored servers
    List {
        /// Only servers of this subscription
        #[arg(short, long)]
        subscription: Option<String>,
    },

    /// Remove stored servers
    Purge {
        /// Remove one subscription's servers
        #[arg(short, long)]
        subscription: Option<String>,

        /// Remove every server
        #[arg(long, default_value = "false")]
        all: bool,
    },

    /// Manage subscriptions
    Sub {
        #[command(subcommand)]
        action: SubAction,
    },
}

#[derive(Subcommand)]
enum SubAction {
    /// Register a new subscription
    Add {
        /// Display name
        remarks: String,
        /// Subscription URL
        url: String,
    },

    /// Remove a subscription and its servers
    Remove { id: String },

    /// List subscriptions
    List,

    /// Enable a subscription
    Enable { id: String },

    /// Disable a subscription
    Disable { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    match cli.command {
        Commands::Update => {
            commands::update(config).await?;
        }

        Commands::Free { id, list } => {
            if list {
                commands::list_free(config)?;
            } else {
                commands::free(config, id).await?;
            }
        }

        Commands::Import {
            link,
            file,
            url,
            subscription,
        } => match (link, file, url) {
            (Some(link), _, _) => commands::import_link(config, &link, subscription)?,
            (_, Some(file), _) => commands::import_file(config, file, subscription)?,
            (_, _, Some(url)) => commands::import_url(config, &url, subscription).await?,
            _ => anyhow::bail!("pass a share link, --file, or --url"),
        },

        Commands::List { subscription } => {
            commands::list(config, subscription)?;
        }

        Commands::Purge { subscription, all } => {
            commands::purge(config, subscription, all)?;
        }

        Commands::Sub { action } => match action {
            SubAction::Add { remarks, url } => commands::sub_add(config, &remarks, &url)?,
            SubAction::Remove { id } => commands::sub_remove(config, &id)?,
            SubAction::List => commands::sub_list(config)?,
            SubAction::Enable { id } => commands::sub_set_enabled(config, &id, true)?,
            SubAction::Disable { id } => commands::sub_set_enabled(config, &id, false)?,
        },
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("subsync=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("subsync=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
