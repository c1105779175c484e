//! xml2owl CLI main entry point

use anyhow::Result;
use clap::Parser;
use xml2owl_cli::{Cli, CommandExecutor};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = CommandExecutor::new().execute(cli.command)?;

    println!("{}", result.message);
    if result.success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
