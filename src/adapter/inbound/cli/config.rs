//! Handler for the `config` command group.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::config::{Config, API_TOKEN_ENV};
use crate::error::Result;

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    let token_source = if std::env::var(API_TOKEN_ENV).is_ok_and(|t| !t.is_empty()) {
        API_TOKEN_ENV
    } else {
        "config file"
    };
    output::config_report(&config, token_source)
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    Config::load(path)?;
    output::confirm(&format!("{} is valid", path.display()));
    Ok(())
}
