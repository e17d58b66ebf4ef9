use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use xform_cli::{execute, Cli, RunConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = RunConfig::try_from(cli)?;
    execute(&config)?;
    Ok(())
}
