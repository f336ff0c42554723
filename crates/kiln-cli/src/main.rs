//! kiln - declarative package-build orchestration CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kiln_cli::cmd;
use kiln_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let dry_run = cli.dry_run;

    match cli.command {
        Commands::Install {
            manifest,
            prefix,
            build_flags,
            timeout,
            verbose,
        } => cmd::install::install(&manifest, prefix, build_flags, timeout, verbose, dry_run).await,
        Commands::Test {
            manifest,
            prefix,
            timeout,
        } => cmd::test::test(&manifest, prefix, timeout).await,
        Commands::Check { manifest } => cmd::check::check(&manifest),
    }
}
