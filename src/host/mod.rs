//! Host ledger collaborator
//!
//! Everything the decision contract needs from the surrounding ledger runtime
//! sits behind `TransactionContext`: point reads and writes, composite keys,
//! partial-key scans, and the transaction id and timestamp. The runtime owns
//! consensus, ordering and atomic commit; none of that lives here.
//!
//! # Provided Hosts
//!
//! - `WorldState` + `Transaction`: in-process state with staged write sets,
//!   used by tests and the local CLI host
//! - `FileWorldState`: durable snapshot of a `WorldState`
//! - `DataDirLock`: one writer per data directory across processes
//!
//! # Invariants
//!
//! - Reads observe committed state only
//! - A transaction's writes are applied all together or not at all
//! - Partial-key scans return keys in ascending order and release their
//!   cursor on every exit path

mod composite;
mod context;
mod errors;
mod file_state;
mod lock;
mod world_state;

pub use composite::{
    create_composite_key, is_composite_key, partial_key_range, split_composite_key,
    COMPOSITE_KEY_SEPARATOR, MAX_UNICODE_RUNE,
};
pub use context::{KeyValue, ScopedIterator, StateIterator, TransactionContext, TxTimestamp};
pub use errors::{HostError, HostResult};
pub use file_state::FileWorldState;
pub use lock::{DataDirLock, LOCK_FILE_NAME};
pub use world_state::{FaultPlan, Transaction, WorldState, WriteSet};
