//! Review-Mirror main entry point
//!
//! This is the command-line interface for mirroring a reviewer's rendered
//! pages to disk.

use anyhow::Context;
use clap::Parser;
use review_mirror::config::{load_config_with_hash, validate, Config, ConfigOverrides};
use review_mirror::crawler::run_crawl;
use review_mirror::output::{print_report, write_markdown_report};
use review_mirror::url::{detail_key, CrawlTarget};
use review_mirror::MirrorError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Review-Mirror: an offline mirror of a reviewer's pages
///
/// Review-Mirror renders every listing page of an account's reviews in a
/// headless browser, follows the links to each review, and writes the fully
/// rendered markup under the output root.
#[derive(Parser, Debug)]
#[command(name = "review-mirror")]
#[command(version = "1.0.0")]
#[command(about = "Mirror a reviewer's rendered pages to disk", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Account whose reviews are mirrored
    #[arg(short, long, env = "LETTERBOXD_USERNAME")]
    account: Option<String>,

    /// Number of listing pages to crawl
    #[arg(short, long)]
    pages: Option<u32>,

    /// Output root directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Also write the run report as markdown to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Validate config and show what would be crawled without launching a browser
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), "defaults".to_string())
        }
    };

    config.apply_overrides(ConfigOverrides {
        account: cli.account,
        pages: cli.pages,
        output_root: cli.output,
        summary_path: cli.summary,
    });
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(&config, &config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("review_mirror=info,warn"),
            1 => EnvFilter::new("review_mirror=debug,info"),
            2 => EnvFilter::new("review_mirror=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration and listing pages
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Review Mirror Dry Run ===\n");

    println!("Target:");
    println!("  Account: {}", config.target.account);
    println!("  Base URL: {}", config.target.base_url);
    println!("  Listing pages: {}", config.target.pages);
    println!("  Detail pattern: {}", config.target.detail_pattern());

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    match &config.browser.chrome_path {
        Some(path) => println!("  Executable: {}", path.display()),
        None => println!("  Executable: auto-detect"),
    }
    println!(
        "  Window: {}x{}",
        config.browser.window_width, config.browser.window_height
    );
    println!(
        "  Timeouts: navigation {}ms, network idle {}ms",
        config.browser.navigation_timeout_ms, config.browser.idle_timeout_ms
    );

    println!("\nCapture:");
    println!("  Settle: {}ms", config.capture.settle_ms);
    println!(
        "  Max scroll iterations: {}",
        config.capture.max_scroll_iterations
    );
    println!(
        "  Consent overlay: {} (decline: {})",
        config.consent.overlay_selector, config.consent.decline_selector
    );

    println!("\nOutput:");
    println!("  Root: {}", config.output.root.display());
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary.display());
    }

    let base_url = Url::parse(&config.target.base_url)?;
    let target = CrawlTarget::new(&base_url, &config.target.account, config.target.pages)?;

    println!("\nListing Pages ({}):", target.len());
    for listing in target.listings() {
        println!(
            "  {} -> {}",
            listing.url,
            listing.key.relative_path(&config.output.extension).display()
        );
    }

    let pattern = config.target.detail_pattern();
    let example = base_url.join(&format!("{}/example/", pattern.trim_end_matches('/')))?;
    if let Ok(key) = detail_key(&example) {
        println!("\nDetail pages map like: {} -> {}", example, key);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would capture {} listing pages", target.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Mirroring {} listing pages for {}",
        config.target.pages,
        config.target.account
    );

    let report = run_crawl(config, config_hash)
        .await
        .context("crawl aborted")?;

    print_report(&report);

    if let Some(path) = &config.output.summary_path {
        write_markdown_report(&report, path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        println!("\n✓ Summary written to: {}", path.display());
    }

    if !report.listing_captured() {
        return Err(MirrorError::NoListingCaptured {
            attempted: report.listing_pages,
        }
        .into());
    }

    Ok(())
}
