mod connect;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use viralbites_core::{SocialPlatform, UserSettings};

#[derive(Debug, Parser)]
#[command(name = "viralbites")]
#[command(about = "Find food spots trending on short-form video near you")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover and verify viral venues around a location
    Search {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// What you are craving, e.g. "birria tacos"
        #[arg(long, short)]
        query: Option<String>,
        /// Prioritize Instagram Reels
        #[arg(long)]
        instagram: bool,
        /// Prioritize YouTube Shorts
        #[arg(long)]
        youtube: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the self-check probes
    Diagnose {
        #[arg(long)]
        json: bool,
    },
    /// Connect a social account through OAuth
    Connect { platform: SocialPlatform },
}

fn settings_for(instagram: bool, youtube: bool) -> UserSettings {
    let mut settings = UserSettings::default();
    if instagram {
        settings.connect(SocialPlatform::Instagram);
    }
    if youtube {
        settings.connect(SocialPlatform::YouTube);
    }
    settings
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = viralbites_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            lat,
            lon,
            query,
            instagram,
            youtube,
            json,
        } => {
            let settings = settings_for(instagram, youtube);
            search::run_search(&config, lat, lon, query.as_deref().unwrap_or(""), &settings, json)
                .await?;
        }
        Commands::Diagnose { json } => search::run_diagnose(&config, json).await?,
        Commands::Connect { platform } => connect::run_connect(&config, platform).await?,
    }

    Ok(())
}
