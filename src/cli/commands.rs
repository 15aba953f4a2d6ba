//! CLI command implementations
//!
//! Every command that touches state runs as exactly one transaction:
//! load the world state, run one contract operation against a staged
//! transaction, then either commit and persist the write set or drop it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::host::{DataDirLock, FileWorldState, TxTimestamp, WorldState};
use crate::ledger::{DecisionContract, LedgerResult};
use crate::observability::{log_event_with_fields, Event, LogSink, Logger, MetricsRegistry};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{error_response, ok_response, read_payload, write_json_line};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// World state file name, relative to `data_dir` (default "world_state.json")
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Log destination: "stdout", "stderr" or "quiet" (default "stderr")
    #[serde(default = "default_log")]
    pub log: String,

    /// How long a write waits for the data directory lock (default 10000)
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_state_file() -> String {
    "world_state.json".to_string()
}
fn default_log() -> String {
    "stderr".to_string()
}
fn default_lock_timeout_ms() -> u64 {
    10_000
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.state_file.trim().is_empty() {
            return Err(CliError::config_error("state_file must not be empty"));
        }

        if Path::new(&self.state_file).components().count() != 1 {
            return Err(CliError::config_error(format!(
                "Invalid state_file: '{}'. Must be a plain file name.",
                self.state_file
            )));
        }

        if self.lock_timeout_ms == 0 {
            return Err(CliError::config_error("lock_timeout_ms must be > 0"));
        }

        self.log_sink()?;

        Ok(())
    }

    /// Parsed log destination
    pub fn log_sink(&self) -> CliResult<LogSink> {
        LogSink::parse(&self.log).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log: '{}'. Must be 'stdout', 'stderr' or 'quiet'.",
                self.log
            ))
        })
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Full path of the world state file
    pub fn state_path(&self) -> PathBuf {
        self.data_path().join(&self.state_file)
    }

    /// Take the exclusive data directory lock
    pub fn lock_data_dir(&self) -> CliResult<DataDirLock> {
        Ok(DataDirLock::acquire(
            self.data_path(),
            Duration::from_millis(self.lock_timeout_ms),
        )?)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run a command and write its JSON response to stdout
///
/// Failures are written as an error envelope and returned as well, so the
/// process exits non-zero. Nothing else reports them.
pub fn run_command(cmd: Command) -> CliResult<()> {
    run_command_to(cmd, &mut std::io::stdout())
}

/// Run a command and write exactly one JSON response line to `out`
pub fn run_command_to<W: Write>(cmd: Command, out: &mut W) -> CliResult<()> {
    match execute(cmd) {
        Ok(data) => write_json_line(out, &ok_response(data)),
        Err(err) => {
            write_json_line(out, &error_response(&err))?;
            Err(err)
        }
    }
}

/// Execute a command and return the `data` part of its response
pub fn execute(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Submit {
            config,
            id,
            payload,
            hash,
        } => {
            let payload = read_payload(&payload)?;
            submit(&config, &id, &payload, &hash)
        }
        Command::Query { config, id } => query(&config, &id),
        Command::QueryHash { config, hash } => query_hash(&config, &hash),
        Command::Verify { config, id } => verify(&config, &id),
        Command::ComputeHash { payload } => {
            let payload = read_payload(&payload)?;
            compute_hash(&payload)
        }
    }
}

/// Create the data directory and an empty world state
pub fn init(config_path: &Path) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let store = FileWorldState::new(config.state_path());

    if store.exists() {
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(config.data_path()).map_err(|e| {
        CliError::config_error(format!(
            "Failed to create directory {:?}: {}",
            config.data_path(),
            e
        ))
    })?;

    let _lock = config.lock_data_dir()?;
    if store.exists() {
        return Err(CliError::already_initialized());
    }
    store.save(&WorldState::new())?;

    Ok(json!({
        "initialized": true,
        "stateFile": store.path().display().to_string()
    }))
}

/// Submit a decision and persist it on success
///
/// The data directory lock is held from load until the save returns, so
/// concurrent submissions are applied one after another.
pub fn submit(config_path: &Path, id: &str, payload: &str, hash: &str) -> CliResult<Value> {
    let config = load_config(config_path)?;
    if !FileWorldState::new(config.state_path()).exists() {
        return Err(CliError::not_initialized());
    }
    let _lock = config.lock_data_dir()?;
    let (store, mut state) = open_state(&config)?;
    let metrics = Arc::new(MetricsRegistry::new());
    let contract = DecisionContract::new().with_metrics(Arc::clone(&metrics));

    let tx_id = Uuid::new_v4().to_string();
    let mut tx = state.begin(tx_id.clone(), Some(now()));

    let record = match contract.submit_decision(&mut tx, id, payload, hash) {
        Ok(record) => record,
        Err(err) => {
            tx.discard();
            log_event_with_fields(
                Event::StateDiscarded,
                &[("code", err.code().code()), ("tx_id", tx_id.as_str())],
            );
            log_metrics(&metrics);
            return Err(err.into());
        }
    };

    let writes = tx.into_writes();
    let applied = state.commit(writes);
    store.save(&state)?;
    log_event_with_fields(
        Event::StateCommitted,
        &[
            ("tx_id", tx_id.as_str()),
            ("writes", applied.to_string().as_str()),
        ],
    );
    log_metrics(&metrics);

    Ok(serde_json::to_value(&record)?)
}

/// Fetch one decision by id
pub fn query(config_path: &Path, id: &str) -> CliResult<Value> {
    read_only(config_path, |contract, state, tx_id| {
        let tx = state.begin(tx_id, Some(now()));
        let result = contract.query_decision(&tx, id);
        tx.discard();
        result.map(|record| json!(record))
    })
}

/// List every decision with the given digest
pub fn query_hash(config_path: &Path, hash: &str) -> CliResult<Value> {
    read_only(config_path, |contract, state, tx_id| {
        let tx = state.begin(tx_id, Some(now()));
        let result = contract.query_by_hash(&tx, hash);
        tx.discard();
        result.map(|records| json!(records))
    })
}

/// Fetch one decision and re-check its digests
pub fn verify(config_path: &Path, id: &str) -> CliResult<Value> {
    read_only(config_path, |contract, state, tx_id| {
        let tx = state.begin(tx_id, Some(now()));
        let result = contract.verify_decision(&tx, id);
        tx.discard();
        result.map(|record| json!({ "verified": true, "record": record }))
    })
}

/// Digest a payload without touching any state
pub fn compute_hash(payload: &str) -> CliResult<Value> {
    let digest = DecisionContract::new().compute_ledger_hash(payload)?;
    Ok(json!({ "digest": digest }))
}

fn read_only<F>(config_path: &Path, op: F) -> CliResult<Value>
where
    F: FnOnce(&DecisionContract, &WorldState, String) -> LedgerResult<Value>,
{
    let config = load_config(config_path)?;
    let (_, state) = open_state(&config)?;
    let metrics = Arc::new(MetricsRegistry::new());
    let contract = DecisionContract::new().with_metrics(Arc::clone(&metrics));

    let result = op(&contract, &state, Uuid::new_v4().to_string());
    log_metrics(&metrics);
    Ok(result?)
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_sink(config.log_sink()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("path", config_path.display().to_string().as_str())],
    );
    Ok(config)
}

fn open_state(config: &Config) -> CliResult<(FileWorldState, WorldState)> {
    let store = FileWorldState::new(config.state_path());
    if !store.exists() {
        return Err(CliError::not_initialized());
    }
    let state = store.load()?;
    log_event_with_fields(
        Event::StateLoaded,
        &[("entries", state.len().to_string().as_str())],
    );
    Ok((store, state))
}

fn now() -> TxTimestamp {
    let now = Utc::now();
    TxTimestamp::new(now.timestamp(), now.timestamp_subsec_nanos())
}

fn log_metrics(metrics: &MetricsRegistry) {
    Logger::trace("METRICS", &[("counters", metrics.to_json().as_str())]);
}
