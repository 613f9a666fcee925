use anyhow::Result;
use clap::Parser;
use medscribe::cli::{Cli, Commands, load_config, run_commands_command, run_config_command, run_demo_command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Demo { script } => {
            run_demo_command(config, &script).await?;
        }
        Commands::Commands => {
            run_commands_command(&config)?;
        }
        Commands::Config => {
            run_config_command(&config)?;
        }
    }

    Ok(())
}
