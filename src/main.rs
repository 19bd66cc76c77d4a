//! dockerrun-deploy CLI - package, upload, and deploy Dockerrun bundles
//!
//! Usage: dockerrun-deploy <COMMAND>
//!
//! Commands:
//!   deploy   Package the run descriptor, upload it, register a version, and deploy it
//!   version  Show version information

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy(args) => commands::deploy::cmd_deploy(args, cli.verbose),
        Commands::Version => {
            println!("dockerrun-deploy {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
