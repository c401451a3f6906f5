//! `mainmenu` command-line entry point

use std::process::ExitCode;

fn main() -> ExitCode {
    mainmenu::cli::run_cli()
}
