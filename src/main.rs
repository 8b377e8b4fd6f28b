use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sliding_quota::clock::SystemTimeSource;
use sliding_quota::config::QuotaConfig;
use sliding_quota::ratelimit::LimiterRegistry;
use sliding_quota::store::build_store;

/// Check qualifiers against a sliding-window limiter.
#[derive(Debug, Parser)]
#[command(name = "sliding-quota", version, about)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Limiter to check against
    #[arg(short, long, default_value = "default")]
    limiter: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Qualifiers to check; read one per line from stdin when omitted
    qualifiers: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => QuotaConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => QuotaConfig::default(),
    };

    let store = build_store(&config.store);
    let registry = LimiterRegistry::from_config(&config, store, Arc::new(SystemTimeSource::new()))?;
    if registry.get(&args.limiter).is_none() {
        anyhow::bail!(
            "unknown limiter {:?}; configured: {}",
            args.limiter,
            registry.names().join(", ")
        );
    }

    if args.qualifiers.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let qualifier = line.trim();
            if !qualifier.is_empty() {
                check(&registry, &args.limiter, qualifier).await?;
            }
        }
    } else {
        for qualifier in &args.qualifiers {
            check(&registry, &args.limiter, qualifier).await?;
        }
    }

    Ok(())
}

async fn check(registry: &LimiterRegistry, limiter: &str, qualifier: &str) -> anyhow::Result<()> {
    let verdict = registry.check(limiter, qualifier).await?;
    println!("{}\t{}", qualifier, verdict.as_str());
    Ok(())
}
