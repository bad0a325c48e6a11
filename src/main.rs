use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quire::app::AppContext;
use quire::cli::{commands, Cli, Commands};
use quire::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quire=info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    match cli.command {
        Commands::Serve { .. } => {
            quire::server::run_server(config).await?;
        }
        Commands::List { host } => {
            commands::list_pages(&config, host.as_deref())?;
        }
        Commands::Sync => {
            let ctx = AppContext::new(config)?;
            commands::sync_all(&ctx).await?;
        }
        Commands::Publish { folder } => {
            let ctx = AppContext::new(config)?;
            commands::publish_folder(&ctx, &folder).await?;
        }
        Commands::Inspect { doc_id } => {
            let ctx = AppContext::new(config)?;
            commands::inspect_document(&ctx, &doc_id).await?;
        }
    }

    Ok(())
}
