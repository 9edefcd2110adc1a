use chrono::Local;
use harvest::{config::Config, info_time, process::harvest, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;

    let start_time = Local::now();
    harvest(&config).await?;
    info_time!(start_time, "Full program time:");

    Ok(())
}
