//! Layering: headless layer compositor
//!
//! Imports images as layers, applies simple edits, flattens the stack and
//! writes a PNG.

mod cli;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use cli::CliArgs;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init(args.debug);

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
