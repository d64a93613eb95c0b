//! CLI for running policy scrapes outside the server
//!
//! Prints one report line per profile, or JSON with `--json`.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use policy_core::config::ScrapeConfig;
use policy_core::domains::policies::actions::{crawl, scrape_profiles, ScrapeReport};
use policy_core::domains::policies::crawler::CrawlLimits;
use policy_core::domains::policies::models::PolicyStore;
use policy_core::domains::policies::sources::{builtin_profiles, find_profile, SourceProfile};
use policy_core::kernel::HttpPageFetcher;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scrape")]
#[command(about = "Scrape university policy pages into the policies table")]
struct Cli {
    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in scrape profiles
    List,

    /// Run built-in profiles (all of them when none are named)
    Run {
        #[arg(long = "profile")]
        profiles: Vec<String>,

        /// Pause between fetches, overrides SCRAPE_DELAY_MS
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Follow links breadth-first from a seed page, staying under its path
    Crawl {
        #[arg(long)]
        seed: String,

        #[arg(long, default_value_t = CrawlLimits::default().max_pages)]
        max_pages: usize,

        #[arg(long, default_value_t = CrawlLimits::default().max_depth)]
        max_depth: usize,

        /// Source name stored on crawled pages
        #[arg(long, default_value = "Policy Crawl")]
        source_name: String,

        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,policy_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => cmd_list(),
        Commands::Run { profiles, delay_ms } => cmd_run(&profiles, delay_ms, cli.json).await,
        Commands::Crawl {
            seed,
            max_pages,
            max_depth,
            source_name,
            delay_ms,
        } => {
            let limits = CrawlLimits {
                max_pages,
                max_depth,
            };
            cmd_crawl(&seed, limits, &source_name, delay_ms, cli.json).await
        }
    }
}

async fn get_pool(config: &ScrapeConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}

fn print_reports(reports: &[ScrapeReport], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        println!(
            "{:<12} attempted={:<4} stored={:<4} skipped={:<4} failed={}",
            report.profile, report.attempted, report.stored, report.skipped, report.failed
        );
    }
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_list() -> Result<()> {
    let site_url = std::env::var("POLICY_SITE_URL")
        .unwrap_or_else(|_| "https://www.example.edu".to_string());

    for profile in builtin_profiles(&site_url)? {
        println!(
            "{:<12} {:<32} {} urls",
            profile.name,
            profile.source_name,
            profile.urls.len()
        );
    }
    Ok(())
}

async fn cmd_run(names: &[String], delay_ms: Option<u64>, json: bool) -> Result<()> {
    let config = ScrapeConfig::from_env()?;
    let all = builtin_profiles(&config.policy_site_url)?;

    let selected: Vec<SourceProfile> = if names.is_empty() {
        all
    } else {
        names
            .iter()
            .map(|name| {
                find_profile(&all, name)
                    .cloned()
                    .with_context(|| format!("Unknown profile '{}'", name))
            })
            .collect::<Result<_>>()?
    };

    let pool = get_pool(&config).await?;
    let fetcher = HttpPageFetcher::new()?;
    let sink = PolicyStore::new(pool);
    let delay = Duration::from_millis(delay_ms.unwrap_or(config.scrape_delay_ms));

    let reports = scrape_profiles(&selected, &fetcher, &sink, delay).await;
    print_reports(&reports, json)?;

    if reports.len() < selected.len() {
        bail!("{} profile(s) could not be run", selected.len() - reports.len());
    }
    Ok(())
}

async fn cmd_crawl(
    seed: &str,
    limits: CrawlLimits,
    source_name: &str,
    delay_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = ScrapeConfig::from_env()?;
    let profile = SourceProfile::new("crawl", source_name, vec![])?;

    let pool = get_pool(&config).await?;
    let fetcher = HttpPageFetcher::new()?;
    let sink = PolicyStore::new(pool);
    let delay = Duration::from_millis(delay_ms.unwrap_or(config.scrape_delay_ms));

    let report = crawl(seed, &profile, &fetcher, &sink, limits, delay).await?;
    print_reports(&[report], json)
}
