use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::bootstrap::build_state;
use crate::infrastructure::config::ConfigService;
use crate::interfaces::http::start_server;

fn to_io(err: crate::domain::error::AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

pub async fn run() -> std::io::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let config = ConfigService::load().map_err(|err| {
        error!(error = %err, "Failed to load configuration");
        to_io(err)
    })?;
    let state = build_state(&config).map_err(to_io)?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting decision query service"
    );
    start_server(state, &config.server.host, config.server.port)?.await
}
