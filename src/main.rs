//! rosterbot - Discord attendance roster bot with a supervised connection.

use clap::Parser;
use std::process::ExitCode;

use rosterbot::cli::{Command, Commands};
use rosterbot::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Commands::parse();

    let settings = match args.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Only the long-running command logs to file; the guard flushes on exit.
    let (_guard, log_dir) = match args.command {
        Command::Run { .. } => match logging::init(settings.logging.dir.as_deref()) {
            Ok((guard, dir)) => (Some(guard), Some(dir)),
            Err(e) => {
                eprintln!("Failed to initialize logging: {}", e);
                return ExitCode::FAILURE;
            }
        },
        _ => (None, None),
    };

    match args.run(settings, log_dir).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
