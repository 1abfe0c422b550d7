mod crawl;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::crawl::SourceChoice;

#[derive(Debug, Parser)]
#[command(name = "teetime-cli")]
#[command(about = "Tee-time aggregator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every club in the directory, sorted by name
    Clubs,
    /// Fetch one date from the upstreams and print the raw records as JSON
    Crawl {
        /// Play date, `YYYY-MM-DD`
        #[arg(long)]
        date: NaiveDate,

        /// Which upstream to call
        #[arg(long, value_enum, default_value = "both")]
        source: SourceChoice,
    },
    /// Consolidate tee times from the cache snapshot file
    Query {
        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,

        /// Hour buckets to keep, e.g. `--hours 6,7,8`
        #[arg(long, value_delimiter = ',')]
        hours: Vec<u8>,

        /// Exact club name to keep; repeatable
        #[arg(long = "favorite")]
        favorites: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("teetime-cli ready; see --help for commands");
        return Ok(());
    };

    let config = teetime_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so stdout stays pipeable JSON.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Clubs => {
            let clubs = teetime_core::load_clubs(&config.clubs_path)?;
            for name in clubs.display_names() {
                println!("{name}");
            }
        }
        Commands::Crawl { date, source } => {
            crawl::run_crawl(&config, date, source).await?;
        }
        Commands::Query {
            start,
            end,
            hours,
            favorites,
        } => {
            crawl::run_query(&config, start, end, hours, favorites).await?;
        }
    }

    Ok(())
}
