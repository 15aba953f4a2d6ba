//! CLI host for the decision ledger
//!
//! Provides command-line interface for:
//! - init: Create the data directory and an empty world state
//! - submit: Verify and commit one decision
//! - query / query-hash / verify: Read-only lookups
//! - compute-hash: Digest preview, no state

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    compute_hash, execute, init, query, query_hash, run, run_command, run_command_to, submit,
    verify, Config,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, ok_response, read_payload, write_json_line};
