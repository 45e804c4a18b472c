use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use parley_cli::{
    cli::{Cli, Commands},
    commands,
};
use parley_config::ParleyConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the CLI flags when present
    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::InitConfig { path, force }) => {
            let path = commands::init_config(path, force)?;
            println!("Wrote example config to {}", path.display());
        }

        Some(Commands::ShowConfig) => {
            let config = ParleyConfig::load(cli.config, cli.host, cli.port)?;
            print!("{}", commands::show_config(&config)?);
        }

        Some(Commands::Serve) | None => {
            let config = ParleyConfig::load(cli.config, cli.host, cli.port)?;
            info!("parley {} starting", env!("CARGO_PKG_VERSION"));
            commands::serve(config).await?;
        }
    }

    Ok(())
}
