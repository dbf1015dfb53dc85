//! DevCamp Server - Main entry point

use anyhow::Result;
use devcamp_common::logging::{init_logging, LogConfig};
use tracing::info;

use devcamp_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("devcamp-server")
        .filter_directives("devcamp_server=debug,tower_http=debug,sqlx=info")
        .build();

    // Environment variables take precedence
    let log_config = log_config.merge_env()?;

    // Dropping the guard flushes the file writer
    let _guard = init_logging(&log_config)?;

    info!("Starting DevCamp Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await
}
