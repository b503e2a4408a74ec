//! Entrypoint.

use clap::Parser;
use config::Opts;
use driver::Driver;
use dotenvy::dotenv;
use runtime::shutdown::ShutdownSignal;
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    if let Ok(custom_env_file) = std::env::var("ENV_FILE") {
        dotenvy::from_filename(custom_env_file)?;
    } else {
        // Try the default .env file, and ignore if it doesn't exist.
        dotenv().ok();
    }

    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!("🛰️ valwatch starting...");

    let shutdown = ShutdownSignal::new()?;
    Driver::new(opts).await?.run(shutdown).await
}
