use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cache;
mod scrape;

#[derive(Debug, Parser)]
#[command(name = "xmall-cli")]
#[command(about = "Scrape foreign e-commerce product pages into normalized JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one or more product URLs and print the results as JSON
    Scrape {
        /// Product page URLs
        #[arg(required = true)]
        urls: Vec<String>,
        /// Ignore cached results and refetch
        #[arg(long)]
        refresh: bool,
        /// Translate text fields and add a KRW price (needs `OPENAI_API_KEY`)
        #[arg(long)]
        translate: bool,
        /// Maximum number of URLs scraped at once
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
        concurrency: u16,
    },
    /// Inspect or prune the product cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Debug, Subcommand)]
enum CacheCommands {
    /// List cached products, newest first
    List,
    /// Remove the cached product for a URL
    Delete { url: String },
    /// Remove every cached product
    Clear,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = xmall_core::load_app_config()?;
    init_tracing(&config.log_level);
    tracing::debug!(?config, "configuration loaded");

    let pipeline = xmall_scraper::ProductPipeline::from_config(&config)?;

    match cli.command {
        Commands::Scrape {
            urls,
            refresh,
            translate,
            concurrency,
        } => {
            let options = scrape::ScrapeOptions {
                refresh,
                translate,
                concurrency: usize::from(concurrency),
            };
            scrape::run_scrape(&pipeline, &config, &urls, options).await?;
        }
        Commands::Cache { command } => match command {
            CacheCommands::List => cache::run_cache_list(&pipeline)?,
            CacheCommands::Delete { url } => cache::run_cache_delete(&pipeline, &url)?,
            CacheCommands::Clear => cache::run_cache_clear(&pipeline)?,
        },
    }

    Ok(())
}
