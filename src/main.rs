//! Command-line driver.

mod cli;
mod error;
mod run;

use crate::cli::{Cli, Command};
use crate::run::Finished;
use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => {
            let cancel = CancellationToken::new();
            tokio::spawn(interrupt(cancel.clone()));
            run::run(args, cancel).await.map(|finished| match finished {
                Finished::Declined => {
                    println!("Aborted; nothing was moved.");
                    ExitCode::SUCCESS
                },
                Finished::Completed { summary, report } => {
                    run::print_summary(&summary, &report);
                    if summary.cancelled {
                        ExitCode::from(INTERRUPTED)
                    } else if summary.has_errors() {
                        ExitCode::from(2)
                    } else {
                        ExitCode::SUCCESS
                    }
                },
            })
        },
        Command::Duplicates { destination } => run::duplicates(&destination).await.map(|()| ExitCode::SUCCESS),
    };
    result.unwrap_or_else(|e| {
        eprintln!("error: {e:?}");
        e.exit_code()
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("Interrupted; finishing moves already in progress");
        eprintln!("Interrupted; finishing moves already in progress...");
        cancel.cancel();
    }
}
