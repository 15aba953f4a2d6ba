//! CLI argument definitions using clap
//!
//! Commands:
//! - decision-ledger init --config <path>
//! - decision-ledger submit --config <path> --id <id> --payload <json|-> --hash <hex>
//! - decision-ledger query --config <path> --id <id>
//! - decision-ledger query-hash --config <path> --hash <hex>
//! - decision-ledger verify --config <path> --id <id>
//! - decision-ledger compute-hash --payload <json|->

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// decision-ledger - verifiable decision records with digest lookup
#[derive(Parser, Debug)]
#[command(name = "decision-ledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize an empty world state
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./decision-ledger.json")]
        config: PathBuf,
    },

    /// Verify a payload against its digest and commit it
    Submit {
        /// Path to configuration file
        #[arg(long, default_value = "./decision-ledger.json")]
        config: PathBuf,

        /// Decision identifier
        #[arg(long)]
        id: String,

        /// JSON payload, or "-" to read it from stdin
        #[arg(long)]
        payload: String,

        /// Hex SHA-256 of the canonical payload
        #[arg(long)]
        hash: String,
    },

    /// Fetch a decision by identifier
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./decision-ledger.json")]
        config: PathBuf,

        /// Decision identifier
        #[arg(long)]
        id: String,
    },

    /// List decisions carrying a digest
    QueryHash {
        /// Path to configuration file
        #[arg(long, default_value = "./decision-ledger.json")]
        config: PathBuf,

        /// Hex SHA-256 digest
        #[arg(long)]
        hash: String,
    },

    /// Fetch a decision and re-check its digests
    Verify {
        /// Path to configuration file
        #[arg(long, default_value = "./decision-ledger.json")]
        config: PathBuf,

        /// Decision identifier
        #[arg(long)]
        id: String,
    },

    /// Print the digest a payload must be submitted with
    ComputeHash {
        /// JSON payload, or "-" to read it from stdin
        #[arg(long)]
        payload: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
