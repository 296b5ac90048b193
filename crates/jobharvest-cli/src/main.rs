use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jobharvest_client::{DropboxUploader, HttpNavigator, SeekParser};
use jobharvest_core::config::DEFAULT_BASE_URL;
use jobharvest_core::export::{artifact_file_name, upload_artifact, write_artifact};
use jobharvest_core::{
    ListingParser, Navigator, Pacing, PaginationPolicy, ResultSet, ScrapeConfig, ScrapeService,
    aggregate,
};

#[derive(Parser)]
#[command(name = "jobharvest", version, about = "Job listings harvester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every query, write the CSV artifact and upload it
    Scrape(ScrapeArgs),
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Site root the query slugs are appended to
    #[arg(long, env = "JOBHARVEST_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Comma-separated query slugs (e.g. "dentist-jobs,podiatrist-jobs")
    #[arg(
        short,
        long,
        env = "JOBHARVEST_QUERIES",
        value_delimiter = ',',
        default_value = "general-practitioner-jobs"
    )]
    queries: Vec<String>,

    /// Only keep listings posted within this many days
    #[arg(short, long, env = "JOBHARVEST_DAYS_BACK", default_value_t = 60)]
    days_back: u32,

    /// Maximum results pages visited per query
    #[arg(long, env = "JOBHARVEST_MAX_PAGES", default_value_t = 1)]
    max_pages: u32,

    /// Pause after each results page (ms)
    #[arg(long, env = "JOBHARVEST_PAGE_DELAY_MS", default_value_t = 4000)]
    page_delay_ms: u64,

    /// Pause between queries (ms)
    #[arg(long, env = "JOBHARVEST_QUERY_DELAY_MS", default_value_t = 6000)]
    query_delay_ms: u64,

    /// Pause after each listing page (ms)
    #[arg(long, env = "JOBHARVEST_DETAIL_DELAY_MS", default_value_t = 2000)]
    detail_delay_ms: u64,

    /// Pause after returning to the results page (ms)
    #[arg(long, env = "JOBHARVEST_BACK_DELAY_MS", default_value_t = 1000)]
    back_delay_ms: u64,

    /// Pause after a failed results page (ms)
    #[arg(long, env = "JOBHARVEST_ERROR_COOL_DOWN_MS", default_value_t = 5000)]
    error_cool_down_ms: u64,

    /// Navigation timeout in seconds
    #[arg(long, env = "JOBHARVEST_TIMEOUT", default_value_t = 45)]
    timeout: u64,

    /// Skip visiting each listing's own page
    #[arg(long, env = "JOBHARVEST_NO_DETAILS", default_value_t = false)]
    no_details: bool,

    /// Running total worth announcing
    #[arg(long, env = "JOBHARVEST_TARGET", default_value_t = 2000)]
    target: usize,

    /// Directory the CSV is written to
    #[arg(short, long, env = "JOBHARVEST_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Run the browser headless (HEADLESS=false shows the window)
    #[arg(long, env = "HEADLESS", default_value_t = true, action = ArgAction::Set)]
    headless: bool,

    /// Render pages in Chromium instead of fetching raw HTML
    #[cfg(feature = "browser")]
    #[arg(long, env = "JOBHARVEST_BROWSER", default_value_t = false)]
    browser: bool,
}

impl ScrapeArgs {
    fn to_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            base_url: self.base_url.clone(),
            queries: self
                .queries
                .iter()
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty())
                .collect(),
            days_back: self.days_back,
            pagination: PaginationPolicy::with_max_pages(self.max_pages),
            pacing: Pacing {
                page_delay: Duration::from_millis(self.page_delay_ms),
                query_delay: Duration::from_millis(self.query_delay_ms),
                detail_delay: Duration::from_millis(self.detail_delay_ms),
                back_delay: Duration::from_millis(self.back_delay_ms),
                error_cool_down: Duration::from_millis(self.error_cool_down_ms),
            },
            scrape_details: !self.no_details,
            target_jobs: self.target,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobharvest=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let started = Instant::now();

    match cli.command {
        Commands::Scrape(args) => {
            if let Err(e) = cmd_scrape(&args).await {
                tracing::error!("Fatal error: {e:#}");
            }
        }
    }

    println!("\nTime: {}", format_elapsed(started.elapsed()));
    Ok(())
}

async fn cmd_scrape(args: &ScrapeArgs) -> Result<()> {
    let config = args.to_config();
    config.validate().context("Invalid configuration")?;

    println!(
        "Seek scraper | last {} days | {} categories",
        config.days_back,
        config.queries.len()
    );

    let parser = SeekParser::new().context("Failed to build listing parser")?;
    let timeout = Duration::from_secs(args.timeout);

    #[cfg(feature = "browser")]
    if args.browser {
        let navigator =
            jobharvest_client::BrowserNavigator::launch_with_timeout(args.headless, timeout)
                .await
                .context("Failed to launch browser")?;
        return run_with(navigator, parser, config, &args.output_dir).await;
    }

    if !args.headless {
        tracing::warn!("HEADLESS=false has no effect without the browser navigator");
    }
    let navigator = HttpNavigator::with_timeout(timeout).context("Failed to create HTTP client")?;
    run_with(navigator, parser, config, &args.output_dir).await
}

/// Runs every query, then aggregates, writes and uploads the artifact.
async fn run_with<N, P>(navigator: N, parser: P, config: ScrapeConfig, output_dir: &Path) -> Result<()>
where
    N: Navigator,
    P: ListingParser,
{
    let with_details = config.scrape_details;
    let target = config.target_jobs;
    let queries = config.queries.clone();
    let service = ScrapeService::new(navigator, parser, config)?;

    let mut all_records = Vec::new();
    let now = chrono::Local::now().naive_local();
    let report = service.run(&mut all_records, now).await;

    println!("\nScraping complete!");
    println!("Total jobs: {}", all_records.len());
    for (query, error) in &report.failed_queries {
        println!("  Failed {query}: {error}");
    }

    let result = aggregate(&all_records, &queries);
    if result.is_empty() {
        println!("\nNo jobs found");
        return Ok(());
    }
    println!("Unique jobs: {}", result.len());

    let file_name = artifact_file_name(with_details, chrono::Utc::now());
    let path = write_artifact(&result.records, output_dir, &file_name)
        .with_context(|| format!("Failed to write {}", output_dir.join(&file_name).display()))?;
    println!("CSV saved: {}", path.display());

    let uploader = match DropboxUploader::from_env() {
        Some(Ok(uploader)) => Some(uploader),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Dropbox client unavailable");
            None
        }
        None => None,
    };
    upload_artifact(uploader.as_ref(), &path, &file_name).await;

    print!("{}", render_summary(&result));
    if result.len() >= target {
        println!("\nSUCCESS! {} jobs", result.len());
    }
    Ok(())
}

fn render_summary(result: &ResultSet) -> String {
    let mut out = String::from("\nJobs by Category:\n");
    for (query, count) in &result.summary {
        out.push_str(&format!("   {query}: {count}\n"));
    }
    out
}

/// Formats an elapsed run time as `1h 2m 3s`, `2m 3s` or `3s`.
fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{hours}h {}m {}s", minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{minutes}m {}s", seconds % 60)
    } else {
        format!("{seconds}s")
    }
}
