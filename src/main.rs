use tracing_subscriber::EnvFilter;

use ezworker::config::WorkerConfig;
use ezworker::http::ReqwestClient;
use ezworker::shutdown::install_shutdown_handler;
use ezworker::worker::Worker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = WorkerConfig::from_env();

    tracing::info!(
        worker_id = %config.worker_id,
        region = %config.region,
        coordinator = %config.coordinator_url,
        production = config.production,
        "Starting ezworker"
    );

    let shutdown = install_shutdown_handler();
    let client = ReqwestClient::new()?;

    Worker::new(config, client).run(shutdown).await;

    Ok(())
}
