//! Skimmer main entry point
//!
//! This is the command-line interface for the skimmer ETL: it loads the
//! settings file, runs one crawl per configured seed, streams the scraped
//! documents into the bulk sink, and prints a final summary.

use anyhow::Context;
use clap::Parser;
use skimmer::config::{load_config_with_hash, Settings};
use skimmer::crawler::{Runner, RunnerConfig};
use skimmer::output::{print_summary, EtlSummary};
use skimmer::sink::{ingest, HttpSink};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Skimmer: a polite site scraper and bulk document ingestor
///
/// Skimmer crawls the configured seed sites breadth-first, respecting
/// per-host politeness delays and scope confinement, extracts structured
/// content from every fetched page, and bulk-commits the resulting
/// documents into the configured sink.
#[derive(Parser, Debug)]
#[command(name = "skimmer")]
#[command(version)]
#[command(about = "A polite site scraper and bulk document ingestor", long_about = None)]
struct Cli {
    /// Path to TOML settings file
    #[arg(value_name = "SETTINGS")]
    settings: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show what would be crawled, without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading settings from: {}", cli.settings.display());
    let (settings, hash) = load_config_with_hash(&cli.settings)
        .with_context(|| format!("failed to load settings from {}", cli.settings.display()))?;
    tracing::info!("Settings loaded (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&settings);
        return Ok(());
    }

    // A bad sink address must fail before any crawling starts.
    let sink = HttpSink::new(&settings.sink).context("invalid sink settings")?;

    let mut summary = EtlSummary::new();
    let mut ingestion_set = Vec::new();

    for seed in &settings.seeds {
        let config = RunnerConfig::from_settings(&settings.runner, seed)
            .with_context(|| format!("invalid runner settings for seed {}", seed.link))?;
        let runner = Runner::new(config);
        let report = runner
            .crawl()
            .await
            .with_context(|| format!("crawl failed for seed {}", seed.link))?;
        summary.absorb(&report);
        ingestion_set.extend(report.documents);
    }

    let ingest_report = if ingestion_set.is_empty() {
        tracing::warn!("no documents scraped, skipping ingestion");
        None
    } else {
        let report = ingest(&sink, ingestion_set)
            .await
            .context("bulk ingestion failed")?;
        Some(report)
    };

    print_summary(&summary, ingest_report.as_ref());

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("skimmer=info,warn"),
            1 => EnvFilter::new("skimmer=debug,info"),
            2 => EnvFilter::new("skimmer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates settings and shows the plan
fn handle_dry_run(settings: &Settings) {
    println!("=== Skimmer Dry Run ===\n");

    println!("Sink:");
    println!("  Host: {}", settings.sink.host);
    println!("  Index: {}", settings.sink.index);
    println!("  Doc type: {}", settings.sink.doc_type);

    println!("\nRunner:");
    println!("  Crawl delay: {}ms", settings.runner.crawl_delay_ms);
    println!("  Worker idle TTL: {}ms", settings.runner.worker_idle_ttl_ms);
    println!("  Auto close: {}", settings.runner.auto_close);
    println!("  User agent: {}", settings.runner.user_agent);
    if settings.runner.max_documents > 0 {
        println!("  Max documents: {}", settings.runner.max_documents);
    } else {
        println!("  Max documents: unlimited");
    }
    if settings.runner.stop_duration_secs > 0 {
        println!("  Stop after: {}s", settings.runner.stop_duration_secs);
    }
    if !settings.runner.stop_at_url.is_empty() {
        println!("  Stop at: {}", settings.runner.stop_at_url);
    }
    if settings.runner.cancel_duration_secs > 0 {
        println!("  Cancel after: {}s", settings.runner.cancel_duration_secs);
    }
    if !settings.runner.cancel_at_url.is_empty() {
        println!("  Cancel at: {}", settings.runner.cancel_at_url);
    }

    println!("\nSeeds ({}):", settings.seeds.len());
    for seed in &settings.seeds {
        let tags = if seed.tags.is_empty() {
            "default (p, div)".to_string()
        } else {
            seed.tags.join(", ")
        };
        println!(
            "  - {} [tags: {}] [tld: {}] [subdomain: {}]",
            seed.link, tags, seed.top_level_domain, seed.subdomain
        );
    }

    println!("\n✓ Settings are valid");
    println!("✓ Would crawl {} seed URL(s)", settings.seeds.len());
}
