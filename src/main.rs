//! sharebox CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. Errors are reported
//! as a JSON error line and a non-zero exit code.

use sharebox::cli;

fn main() {
    if let Err(e) = cli::run() {
        let _ = cli::write_error(e.code_str(), e.message());
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
