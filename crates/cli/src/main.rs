//! snapseek command-line entry point.
//!
//! Thin frontend over the resolution engine: one subcommand per public
//! operation. Logging goes to stderr so stdout stays scriptable.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use snapseek_client::Resolver;
use snapseek_core::{AppConfig, ArchiveService};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snapseek", version, about = "Resolve URLs to existing archive snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a URL to its best archived snapshot.
    Resolve {
        /// The URL to look up.
        url: String,

        /// Archive service to query (wayback|ghostarchive).
        #[arg(long)]
        service: Option<String>,

        /// Maximum snapshots to return (1-300).
        #[arg(long)]
        max: Option<usize>,

        /// Emit the full resolution as JSON instead of the best URL.
        #[arg(long)]
        json: bool,
    },

    /// Fetch the page title for a URL.
    Title {
        /// The URL to fetch.
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Resolve { url, service, max, json } => {
            if let Some(name) = service {
                match ArchiveService::parse(&name) {
                    Some(service) => config.service = service,
                    None => bail!("unknown service: {name} (expected wayback|ghostarchive)"),
                }
            }
            if let Some(max) = max {
                config.max_snapshots = max;
            }
            config.validate()?;

            let resolver = Resolver::new(config)?;
            let resolution = resolver.resolve_archive(&url).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else if resolution.rate_limited {
                bail!("rate limited by the archive service, try again later");
            } else if let Some(best) = &resolution.best_url {
                println!("{best}");
                if resolution.snapshots.len() > 1 {
                    tracing::info!("{} more snapshot(s); use --json for the full list", resolution.snapshots.len() - 1);
                }
            } else {
                bail!("no snapshot found");
            }
        }

        Command::Title { url } => {
            let resolver = Resolver::new(config)?;
            println!("{}", resolver.extract_title(&url).await);
        }
    }

    Ok(())
}
