//! author-census CLI: OpenReview author gender census.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use author_census::census::Census;
use author_census::config::{CensusConfig, DEFAULT_CONFIG_FILE};
use author_census::directory::OpenReviewClient;
use author_census::gender::categorize_declared;
use author_census::pool::collect_pool;
use author_census::predict::GenderizeClient;

#[derive(Parser)]
#[command(
    name = "author-census",
    version,
    about = "Gender census of OpenReview submission authors"
)]
struct Cli {
    /// Run configuration (TOML).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Collect, resolve and categorize every author, then write the output file.
    Run {
        /// Output path (overrides `output` in the config).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Collect the author pool only and print the sorted identifiers.
    Pool,

    /// Show the category a declared gender literal maps to.
    Categorize {
        /// Declared gender, matched exactly.
        value: String,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            let config = CensusConfig::default();
            config.save(&cli.config, force)?;
            println!("Wrote default configuration to {}", cli.config.display());
            println!("Venues:");
            for (year, invitation) in &config.venues {
                println!("  {year}: {invitation}");
            }
        }

        Commands::Run { output } => {
            let mut config = CensusConfig::load(&cli.config)?;
            if let Some(output) = output {
                config.output = output;
            }
            let directory = OpenReviewClient::new(&config.directory);
            let predictor = GenderizeClient::new(&config.predictor);
            let report = Census::new(config, directory, predictor).run()?;
            println!("{report}");
        }

        Commands::Pool => {
            let config = CensusConfig::load(&cli.config)?;
            let directory = OpenReviewClient::new(&config.directory);
            let (pool, stats) = collect_pool(&directory, &config.venues)?;
            for id in pool.iter() {
                println!("{id}");
            }
            eprintln!(
                "{} identifiers from {} submissions across {} venues",
                pool.len(),
                stats.submissions,
                stats.venues
            );
        }

        Commands::Categorize { value } => {
            let category = categorize_declared(&value)?;
            println!("{value:?} -> {category}");
        }
    }

    Ok(())
}
