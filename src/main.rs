use clap::Parser;
use tracing::{debug, info};

use upsdash::adapter::inbound::cli::command::{Cli, Commands, ConfigCommand};
use upsdash::adapter::inbound::cli::output::{self, OutputConfig};
use upsdash::adapter::inbound::cli::{config as config_cmd, status, watch};
use upsdash::config::Config;
use upsdash::error::Result;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if let Err(e) = run(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Config(ConfigCommand::Show) => config_cmd::execute_show(&cli.config),
        Commands::Config(ConfigCommand::Validate) => config_cmd::execute_validate(&cli.config),
        Commands::Status => {
            let config = load(&cli)?;
            status::execute(&config).await
        }
        Commands::Watch(args) => {
            let config = load(&cli)?;
            info!(base_url = %config.server.base_url, "upsdash watching");
            let result = watch::execute(&config, args.once).await;
            info!("upsdash stopped");
            result
        }
    }
}

/// Load the config file and start logging, raising the level for `-v`.
fn load(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(&cli.config)?;
    match output::verbosity() {
        0 => {}
        1 => config.logging.level = "debug".into(),
        _ => config.logging.level = "trace".into(),
    }
    config.init_logging();
    debug!(path = %cli.config.display(), "Configuration loaded");
    Ok(config)
}
