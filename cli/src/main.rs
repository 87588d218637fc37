pub mod commands;
pub mod spmd;

use std::process::ExitCode;

use clap::Parser;
use commands::Commands;
use log::error;
use shared::{env, logger};

/// 🌀 Distributed escape-time renderer
///
/// Splits the canvas into row bands, one per rank, and gathers them at rank 0.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    env::init();
    logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(command) => spmd::run_tcp(&command).await,
        Commands::Local(command) => spmd::run_local(&command).await,
    };

    match result {
        Ok(Some(report)) => {
            println!("{}", report.summary());
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
