// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use shopcrawl::cli::{self, crawl_cmd::CrawlArgs, output};
use shopcrawl::config::CrawlConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shopcrawl",
    about = "Two-phase catalog crawler for rendered storefronts",
    version,
    after_help = "Run 'shopcrawl <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover product URLs (if none are stored) and extract product pages
    Crawl {
        /// Workers per phase, each with its own browser tab
        #[arg(long)]
        workers: Option<usize>,
        /// Maximum number of stored product URLs to extract in this run
        #[arg(long)]
        batch: Option<usize>,
        /// Crawl every category instead of a single one
        #[arg(long)]
        all_categories: bool,
        /// Position of the category to crawl in the navigation bar
        #[arg(long, conflicts_with = "all_categories")]
        category: Option<usize>,
        /// Run discovery even when product URLs are already stored
        #[arg(long)]
        force_discovery: bool,
        /// Show the browser window
        #[arg(long)]
        headful: bool,
        /// JSON site adapter overriding the built-in selectors
        #[arg(long)]
        site: Option<PathBuf>,
        /// Store path (default ~/.shopcrawl/catalog.db)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Show store counts and browser availability
    Status {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print stored products as JSON lines
    Export {
        #[arg(long)]
        db: Option<PathBuf>,
        /// Maximum number of products to print (default: all)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Run the extraction pipeline on a saved product page
    Extract {
        /// Saved HTML of a rendered product page
        html: PathBuf,
        /// URL the page was saved from
        #[arg(long)]
        url: String,
        /// JSON site adapter overriding the built-in selectors
        #[arg(long)]
        site: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

/// Store path from the flag, else the environment, else the default.
fn db_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(path),
        None => Ok(CrawlConfig::from_env()?.db_path),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var(output::ENV_JSON, "1");
    }
    if cli.quiet {
        std::env::set_var(output::ENV_QUIET, "1");
    }

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "shopcrawl", &mut std::io::stdout());
        return Ok(());
    }

    cli::logging::init(cli.verbose, cli.json)?;

    match cli.command {
        Commands::Crawl {
            workers,
            batch,
            all_categories,
            category,
            force_discovery,
            headful,
            site,
            db,
        } => {
            cli::crawl_cmd::run(CrawlArgs {
                workers,
                batch,
                all_categories,
                category,
                force_discovery,
                headful,
                site,
                db,
            })
            .await
        }
        Commands::Status { db } => cli::status::run(&db_path(db)?).await,
        Commands::Export { db, limit } => cli::export_cmd::run(&db_path(db)?, limit.unwrap_or(usize::MAX)).await,
        Commands::Extract { html, url, site } => {
            let site = cli::crawl_cmd::load_site(site.as_ref())?;
            cli::extract_cmd::run(&html, &url, &site).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}
