use anyhow::Result;
use clap::Parser;
use tracing::info;
use vibes_backend::config::loader;
use vibes_backend::server::server::{self, AppState};
use vibes_backend::utils::logging::{self, LogLevel};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "vibes-backend.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum, ignore_case = true)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let service_config = loader::load(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Wire providers and the credential cache
    // -------------------------------

    let state = AppState::from_config(&service_config).await?;

    // -------------------------------
    // 3. Serve
    // -------------------------------

    info!("Service starting...");
    server::start(&service_config.settings, state).await
}
