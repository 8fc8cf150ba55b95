//! Sitecrawl main entry point
//!
//! This is the command-line interface for the sitecrawl single-site crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use sitecrawl::config::{load_config_with_hash, validate, Config, MAX_SEARCH_WORDS};
use sitecrawl::crawler::crawl;
use sitecrawl::output::{print_statistics, write_csv_report, CrawlStatistics, LinkGraph};
use tracing_subscriber::EnvFilter;

/// Sitecrawl: a bounded single-site crawler
///
/// Sitecrawl starts from a seed URL, follows links that stay on the same
/// site, and writes one CSV row per page with its title, excerpt, links,
/// and images.
#[derive(Parser, Debug)]
#[command(name = "sitecrawl")]
#[command(version = "1.0.0")]
#[command(about = "A bounded single-site crawler", long_about = None)]
struct Cli {
    /// Seed URL; prompted for interactively when omitted
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Maximum number of fetches in progress at once
    #[arg(long, value_name = "N")]
    max_concurrency: Option<usize>,

    /// Maximum number of distinct pages to crawl
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Word to look for in page titles and excerpts (repeatable)
    #[arg(short, long = "search", value_name = "WORD")]
    search: Vec<String>,

    /// Path of the CSV report
    #[arg(long, value_name = "PATH")]
    report: Option<String>,

    /// Path of the DOT link graph
    #[arg(long, value_name = "PATH")]
    graph: Option<String>,

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

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);

    let seed = match cli.url.clone() {
        Some(url) => url,
        None => prompt_for_crawl(&mut config)?,
    };

    validate(&config).context("Invalid configuration")?;

    handle_crawl(&seed, &config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitecrawl=info,warn"),
            1 => EnvFilter::new("sitecrawl=debug,info"),
            2 => EnvFilter::new("sitecrawl=trace,debug"),
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

/// Command-line flags win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(n) = cli.max_concurrency {
        config.crawler.max_concurrency = n;
    }
    if let Some(n) = cli.max_pages {
        config.crawler.max_pages = n;
    }
    if !cli.search.is_empty() {
        config.output.search_words = cli.search.clone();
    }
    if let Some(path) = &cli.report {
        config.output.report_path = path.clone();
    }
    if let Some(path) = &cli.graph {
        config.output.graph_path = Some(path.clone());
    }
}

/// Asks for the seed URL, limits, and search words on the terminal
///
/// Empty answers keep the configured values. A blank search word ends the
/// word list.
fn prompt_for_crawl(config: &mut Config) -> anyhow::Result<String> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        bail!("No seed URL given; pass one as an argument");
    }
    let mut input = stdin.lock();

    let url = prompt(&mut input, "Enter the website URL: ")?;
    if url.is_empty() {
        bail!("No seed URL given");
    }

    let concurrency = prompt(
        &mut input,
        &format!(
            "Max concurrent fetches [{}]: ",
            config.crawler.max_concurrency
        ),
    )?;
    if !concurrency.is_empty() {
        config.crawler.max_concurrency = concurrency
            .parse()
            .with_context(|| format!("Not a number: {}", concurrency))?;
    }

    let pages = prompt(
        &mut input,
        &format!("Max pages to crawl [{}]: ", config.crawler.max_pages),
    )?;
    if !pages.is_empty() {
        config.crawler.max_pages = pages
            .parse()
            .with_context(|| format!("Not a number: {}", pages))?;
    }

    if config.output.search_words.is_empty() {
        println!(
            "Enter up to {} search words, one per line (blank line to finish):",
            MAX_SEARCH_WORDS
        );
        while config.output.search_words.len() < MAX_SEARCH_WORDS {
            let word = prompt(
                &mut input,
                &format!("  word {}: ", config.output.search_words.len() + 1),
            )?;
            if word.is_empty() {
                break;
            }
            config.output.search_words.push(word);
        }
    }

    Ok(url)
}

fn prompt(input: &mut impl BufRead, message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Handles the main crawl operation and writes every output
async fn handle_crawl(seed: &str, config: &Config) -> anyhow::Result<()> {
    if !config.output.search_words.is_empty() {
        tracing::info!("Search words: {}", config.output.search_words.join(", "));
    }

    let started = Instant::now();
    let visited = match crawl(seed, config).await {
        Ok(visited) => visited,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };
    let elapsed = started.elapsed();

    let report_path = Path::new(&config.output.report_path);
    let rows = write_csv_report(&visited, &config.output.search_words, report_path)
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
    println!("✓ Report with {} pages written to: {}", rows, report_path.display());

    if let Some(graph_path) = &config.output.graph_path {
        let graph = LinkGraph::from_visited(&visited);
        graph
            .write_dot(Path::new(graph_path))
            .with_context(|| format!("Failed to write link graph to {}", graph_path))?;
        println!(
            "✓ Link graph ({} nodes, {} edges) written to: {}",
            graph.node_count(),
            graph.edge_count(),
            graph_path
        );
    }

    println!();
    print_statistics(&CrawlStatistics::from_visited(&visited, elapsed));

    Ok(())
}
