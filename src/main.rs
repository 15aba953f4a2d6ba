//! decision-ledger CLI entry point
//!
//! Parses arguments, dispatches to the CLI module and exits non-zero on
//! failure. The CLI has already written the error envelope to stdout by
//! then. All logic lives in `cli`.

use decision_ledger::cli;

fn main() {
    if cli::run().is_err() {
        std::process::exit(1);
    }
}
