//! Codelist CLI - status propagation and tree views for clinical codelists

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = codelist_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
