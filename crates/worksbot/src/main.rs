//! WorksBot server.
//!
//! # Usage
//!
//! ```bash
//! worksbot                                  # worksbot.toml from cwd or the user config dir
//! worksbot --config deploy/worksbot.toml --profile production
//! worksbot --check                          # load, validate and exit
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use worksbot::runtime::{RuntimeBuilder, WorksBotRuntime};

#[derive(Parser)]
#[command(name = "worksbot")]
#[command(about = "LINE WORKS webhook bot")]
#[command(version)]
struct Cli {
    /// Configuration file to load instead of searching
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile (development, production or a custom name)
    #[arg(short, long)]
    profile: Option<String>,

    /// Validate configuration and templates, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = RuntimeBuilder::new().with_env();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &cli.profile {
        builder = builder.profile(profile);
    }

    let config = builder.load().context("failed to load configuration")?;
    let runtime = WorksBotRuntime::from_config(&config).context("invalid configuration")?;

    if cli.check {
        info!(
            bind = %config.server.bind_addr(),
            bot_no = config.works.bot_no,
            "Configuration OK"
        );
        println!("Configuration OK");
        return Ok(());
    }

    runtime.run().await?;

    Ok(())
}
