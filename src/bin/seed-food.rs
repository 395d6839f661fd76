use anyhow::Result;
use clap::Parser;
use tracing::info;
use vibes_backend::config::settings::LoggingConfig;
use vibes_backend::providers::food::{sample_items, FoodStore};
use vibes_backend::utils::logging;

/// Replace the food collection with the sample dataset.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "FOOD_DATA_PATH", default_value = "data/foods.json")]
    path: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(&LoggingConfig::default());

    FoodStore::create(&args.path).replace_all(sample_items()).await?;

    info!(path = %args.path, "Food data seeded!");
    Ok(())
}
