use anyhow::Result;
use brand_atlas::{build_engine, config, server, Brand, FilterState, Period};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the statistics API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Print statistics and metrics for one region
    Stats {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(short, long)]
        region: String,
        /// Brands to count; all brands when omitted
        #[arg(short, long, value_delimiter = ',')]
        brands: Vec<Brand>,
        #[arg(short, long, default_value = "quarter")]
        period: Period,
    },
    /// Print a head-to-head table of two brands across all regions
    Compare {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(short = 'a', long = "a")]
        brand_a: Brand,
        #[arg(short = 'b', long = "b")]
        brand_b: Brand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(&config)?;
            let engine = build_engine(&app_config)?;
            server::start_server(app_config, engine).await?;
        }
        Commands::Stats {
            config,
            region,
            brands,
            period,
        } => {
            let app_config = config::AppConfig::load_from_file(&config)?;
            let engine = build_engine(&app_config)?;

            let filter = if brands.is_empty() {
                engine.default_filter()
            } else {
                FilterState::from_parts(engine.catalog(), brands, std::iter::empty())
            };

            match engine.region_report(&region, &filter, period) {
                Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                None => anyhow::bail!("Unknown region: {}", region),
            }
        }
        Commands::Compare {
            config,
            brand_a,
            brand_b,
        } => {
            if brand_a == brand_b {
                anyhow::bail!("Cannot compare {} with itself", brand_a);
            }
            let app_config = config::AppConfig::load_from_file(&config)?;
            let engine = build_engine(&app_config)?;
            let summary = engine.compare(brand_a, brand_b);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
