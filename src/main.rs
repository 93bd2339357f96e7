use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use watt_and_where::{
    config::ConfigLoader,
    engine::EngineBuilder,
    notify::TracingNotifier,
    plan::Plan,
    session::Session,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Watt & Where? rules engine runner")]
struct Cli {
    /// Path to the game config YAML file
    #[arg(long, default_value = "scenarios/watt_and_where.yaml")]
    config: PathBuf,

    /// Override the RNG seed from the config
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of years in a game
    #[arg(long)]
    years: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play a scripted placement plan through every year and print the result
    Autoplay {
        #[arg(long, default_value = "plans/green_sweep.yaml")]
        plan: PathBuf,
    },
    /// Serve the JSON API for a browser front-end
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ConfigLoader::new(".");
    let mut config = loader.load(&cli.config)?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(years) = cli.years {
        config.max_years = years;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let catalog = loader.load_catalog(&config)?;
    tracing::info!(
        game = %config.name,
        seed = config.seed,
        years = config.max_years,
        "configuration loaded"
    );

    match cli.command {
        Command::Autoplay { plan } => {
            let plan = Plan::load(&plan)?;
            let seed = config.seed;
            let engine = EngineBuilder::new(config).with_catalog(catalog).build()?;
            let mut session = Session::new(engine, seed, TracingNotifier);
            let (report, summary) = plan.run(&mut session)?;
            println!(
                "Played {} years: {} actions applied, {} skipped for budget.",
                report.years_played, report.applied, report.skipped
            );
            println!(
                "Emissions {} | Budget ${}M | Approval {}% | Reliability {}%",
                summary.emissions, summary.budget, summary.approval, summary.reliability
            );
            if summary.badges.is_empty() {
                println!("No badges earned this time");
            } else {
                for badge in &summary.badges {
                    println!("  {badge}");
                }
            }
        }
        Command::Serve { host, port } => {
            web::run(WebServerConfig {
                config,
                catalog,
                host,
                port,
            })
            .await?;
        }
    }
    Ok(())
}
