//! Handler for the `status` command.

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::backend::StatusClient;
use crate::config::Config;
use crate::error::Result;

/// Execute `status`: fetch the current snapshot once and print it.
pub async fn execute(config: &Config) -> Result<()> {
    let client = StatusClient::from_config(&config.server)?;
    let snapshot = client.fetch_status().await?;
    output::status_report(&snapshot);
    Ok(())
}
