use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use bingo_live::client::cli::{self, Args};
use bingo_live::client::config::Config;
use bingo_live::client::logging::init_logging;

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    config.apply_overrides(&args.overrides());

    init_logging(
        config.logging.console,
        config.log_file_path(),
        args.verbose,
    );

    match cli::run(args, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "[cli] Command failed");
            if !e.is_reported() {
                eprintln!("{}", e);
            }
            ExitCode::FAILURE
        }
    }
}
