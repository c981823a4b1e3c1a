//! WARNO replay scanner CLI.

use clap::Parser;

use warno_replays::Settings;
use warno_replays::cli::commands::{extract, init, players, scan, watch};
use warno_replays::cli::{Cli, Commands};
use warno_replays::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().or_else(Settings::default_config_path);

    // Init must work before a valid settings file exists
    if let Commands::Init { force } = cli.command {
        let path = config_path
            .ok_or_else(|| anyhow::anyhow!("No config directory on this platform; pass --config"))?;
        return init::run_init(&path, force);
    }

    let mut settings = match &config_path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    if cli.verbose {
        settings.logging.default = "info".to_string();
    }
    logging::init_with_config(&settings.logging);

    match &cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Config => init::run_config(&settings, config_path.as_deref()),
        Commands::Scan(args) => scan::run_scan(args, &settings),
        Commands::Extract { file, compact } => extract::run_extract(file, *compact),
        Commands::Watch(args) => watch::run_watch(args, &settings).await,
        Commands::Players(args) => players::run_players(args, &settings),
    }
}
