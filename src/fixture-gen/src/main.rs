//! Fixture generator CLI — write synthetic Sales and Views tables, and
//! inspect existing ones.

use clap::{Parser, Subcommand};
use event_metrics_core::config::{AppConfig, DataConfig};
use event_metrics_datasets::FixtureGenerator;
use tracing::info;

#[derive(Parser)]
#[command(name = "fixture-gen")]
#[command(about = "Event Metrics fixture tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate both tables
    Generate {
        /// Number of sales rows
        #[arg(long)]
        sales_rows: Option<usize>,

        /// Number of view rows
        #[arg(long)]
        views_rows: Option<usize>,

        /// Calendar year of every generated date
        #[arg(long)]
        year: Option<i32>,

        /// Distinct user ids in the Views table
        #[arg(long)]
        users: Option<u32>,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Sales table output path
        #[arg(long)]
        sales: Option<String>,

        /// Views table output path
        #[arg(long)]
        views: Option<String>,
    },

    /// Load both tables and print their filter options as JSON
    Inspect {
        /// Sales table path
        #[arg(long)]
        sales: Option<String>,

        /// Views table path
        #[arg(long)]
        views: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_metrics_datasets=info,fixture_gen=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    match cli.command {
        Commands::Generate {
            sales_rows,
            views_rows,
            year,
            users,
            seed,
            sales,
            views,
        } => {
            let generator_config = &mut config.generator;
            if let Some(n) = sales_rows {
                generator_config.sales_rows = n;
            }
            if let Some(n) = views_rows {
                generator_config.views_rows = n;
            }
            if let Some(y) = year {
                generator_config.year = y;
            }
            if let Some(u) = users {
                generator_config.user_pool = u;
            }
            if seed.is_some() {
                generator_config.seed = seed;
            }
            let data = override_paths(config.data, sales, views);

            let mut generator = FixtureGenerator::new(config.generator)?;
            let summary = generator.write_files(&data.sales_path, &data.views_path)?;
            info!(
                sales_rows = summary.sales_rows,
                views_rows = summary.views_rows,
                year = summary.year,
                "Fixtures generated"
            );
            println!("Sales:  {} ({} rows)", data.sales_path, summary.sales_rows);
            println!("Views:  {} ({} rows)", data.views_path, summary.views_rows);
        }

        Commands::Inspect { sales, views } => {
            let data = override_paths(config.data, sales, views);
            let ctx = event_metrics_datasets::load_context(&data)?;
            println!("{}", serde_json::to_string_pretty(&ctx.filter_options())?);
        }
    }

    Ok(())
}

fn override_paths(mut data: DataConfig, sales: Option<String>, views: Option<String>) -> DataConfig {
    if let Some(path) = sales {
        data.sales_path = path;
    }
    if let Some(path) = views {
        data.views_path = path;
    }
    data
}
