mod collect;
mod sectors;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::collect::CollectCommands;

#[derive(Debug, Parser)]
#[command(name = "leadmap")]
#[command(about = "Collect and score business leads from Google Places")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run collection for configured sectors
    Collect {
        #[command(subcommand)]
        command: CollectCommands,
    },
    /// Run a single ad hoc search query
    Search {
        /// Free-text query, e.g. "pollerías en Huancayo"
        query: String,
        /// Sector label to file results under and score against
        #[arg(long)]
        sector: Option<String>,
        /// Keep only places whose address contains the configured city
        #[arg(long)]
        strict_locality: bool,
        /// Output file (defaults to results.json in the output directory)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the plan without calling the API
        #[arg(long)]
        dry_run: bool,
    },
    /// List the sector catalog
    Sectors,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = leadmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let Some(command) = cli.command else {
        println!("leadmap: no command given (try `leadmap --help`)");
        return Ok(());
    };

    let catalog = leadmap_core::load_sectors(&config.sectors_path)?;

    match command {
        Commands::Collect { command } => match command {
            CollectCommands::Sector { name, dry_run } => {
                collect::run_collect_sector(&config, &catalog, &name, dry_run).await?;
            }
            CollectCommands::Batch { only, dry_run } => {
                collect::run_collect_batch(&config, &catalog, &only, dry_run).await?;
            }
            CollectCommands::Deep { name, dry_run } => {
                collect::run_collect_deep(&config, &catalog, &name, dry_run).await?;
            }
        },
        Commands::Search {
            query,
            sector,
            strict_locality,
            output,
            dry_run,
        } => {
            let request = collect::SearchRequest {
                query,
                sector,
                strict_locality,
                output,
            };
            collect::run_search(&config, &catalog, &request, dry_run).await?;
        }
        Commands::Sectors => sectors::run_list_sectors(&config, &catalog),
    }

    Ok(())
}
