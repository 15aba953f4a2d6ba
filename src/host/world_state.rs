//! In-process world state and transactions
//!
//! `WorldState` is the committed key/value map. A `Transaction` reads that
//! committed map and stages its writes in a `WriteSet`; the host applies the
//! write set with `WorldState::commit` only after the whole invocation
//! succeeded. A failed invocation drops its write set, so nothing it issued
//! is ever observable.
//!
//! `FaultPlan` lets tests make individual host calls fail.

use std::cell::Cell;
use std::collections::BTreeMap;

use super::composite;
use super::context::{KeyValue, ScopedIterator, StateIterator, TransactionContext, TxTimestamp};
use super::errors::{HostError, HostResult};

/// Committed key/value state, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldState {
    entries: BTreeMap<String, Vec<u8>>,
}

impl WorldState {
    /// Creates an empty world state
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a world state from existing entries
    pub fn from_entries(entries: BTreeMap<String, Vec<u8>>) -> Self {
        Self { entries }
    }

    /// Returns the committed value for a key
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Returns all committed entries
    pub fn entries(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.entries
    }

    /// Returns the number of committed keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been committed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Opens a transaction over the current committed state.
    ///
    /// `timestamp` is `None` when the host has no consensus time to offer.
    pub fn begin(&self, tx_id: impl Into<String>, timestamp: Option<TxTimestamp>) -> Transaction<'_> {
        Transaction {
            state: self,
            tx_id: tx_id.into(),
            timestamp,
            writes: WriteSet::default(),
            faults: FaultPlan::default(),
            open_iterators: Cell::new(0),
        }
    }

    /// Applies a write set atomically, in the order the writes were issued.
    ///
    /// Returns the number of keys written.
    pub fn commit(&mut self, writes: WriteSet) -> usize {
        let count = writes.len();
        for (key, value) in writes.writes {
            self.entries.insert(key, value);
        }
        count
    }
}

/// Writes staged by one transaction, in issue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet {
    writes: Vec<(String, Vec<u8>)>,
}

impl WriteSet {
    /// Keys in the order they were written
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.writes.iter().map(|(k, _)| k.as_str())
    }

    /// Staged (key, value) pairs in issue order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.writes.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Host calls to fail on purpose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultPlan {
    /// Every `get_state` fails
    pub fail_reads: bool,
    /// The n-th `put_state` (0-based) fails
    pub fail_write_at: Option<usize>,
    /// Opening a range scan fails
    pub fail_scan_open: bool,
    /// A range scan fails after yielding this many entries
    pub fail_scan_after: Option<usize>,
}

impl FaultPlan {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn fail_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn fail_write_at(mut self, index: usize) -> Self {
        self.fail_write_at = Some(index);
        self
    }

    pub fn fail_scan_open(mut self) -> Self {
        self.fail_scan_open = true;
        self
    }

    pub fn fail_scan_after(mut self, entries: usize) -> Self {
        self.fail_scan_after = Some(entries);
        self
    }
}

/// One invocation's view of the world state.
pub struct Transaction<'a> {
    state: &'a WorldState,
    tx_id: String,
    timestamp: Option<TxTimestamp>,
    writes: WriteSet,
    faults: FaultPlan,
    open_iterators: Cell<usize>,
}

impl<'a> Transaction<'a> {
    /// Attach a fault plan
    pub fn with_faults(mut self, faults: FaultPlan) -> Self {
        self.faults = faults;
        self
    }

    /// Writes staged so far
    pub fn writes(&self) -> &WriteSet {
        &self.writes
    }

    /// Number of range scans opened and not yet closed
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.get()
    }

    /// Ends the transaction, handing back its writes for commit
    pub fn into_writes(self) -> WriteSet {
        self.writes
    }

    /// Ends the transaction without committing anything
    pub fn discard(self) {}
}

impl TransactionContext for Transaction<'_> {
    fn get_state(&self, key: &str) -> HostResult<Option<Vec<u8>>> {
        if self.faults.fail_reads {
            return Err(HostError::state_read(key, "injected read failure"));
        }
        Ok(self.state.get(key).map(<[u8]>::to_vec))
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> HostResult<()> {
        if key.is_empty() {
            return Err(HostError::state_write(key, "key must not be empty"));
        }
        if self.faults.fail_write_at == Some(self.writes.len()) {
            return Err(HostError::state_write(key, "injected write failure"));
        }
        self.writes.writes.push((key.to_string(), value.to_vec()));
        Ok(())
    }

    fn state_by_partial_composite_key(
        &self,
        namespace: &str,
        prefix: &[&str],
    ) -> HostResult<ScopedIterator<'_>> {
        if self.faults.fail_scan_open {
            return Err(HostError::iteration("injected scan open failure"));
        }

        let (start, end) = composite::partial_key_range(namespace, prefix)?;
        let entries: Vec<KeyValue> = self
            .state
            .entries
            .range(start..end)
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();

        self.open_iterators.set(self.open_iterators.get() + 1);

        Ok(ScopedIterator::new(Box::new(SnapshotIterator {
            entries: entries.into_iter(),
            open_iterators: &self.open_iterators,
            fail_after: self.faults.fail_scan_after,
            yielded: 0,
            closed: false,
        })))
    }

    fn tx_id(&self) -> String {
        self.tx_id.clone()
    }

    fn tx_timestamp(&self) -> HostResult<TxTimestamp> {
        self.timestamp.ok_or(HostError::TimestampUnavailable)
    }
}

/// Cursor over a range copied out of the committed state.
struct SnapshotIterator<'a> {
    entries: std::vec::IntoIter<KeyValue>,
    open_iterators: &'a Cell<usize>,
    fail_after: Option<usize>,
    yielded: usize,
    closed: bool,
}

impl StateIterator for SnapshotIterator<'_> {
    fn next_entry(&mut self) -> HostResult<Option<KeyValue>> {
        if self.fail_after == Some(self.yielded) {
            return Err(HostError::iteration("injected scan failure"));
        }
        let next = self.entries.next();
        if next.is_some() {
            self.yielded += 1;
        }
        Ok(next)
    }

    fn close(&mut self) -> HostResult<()> {
        if !self.closed {
            self.closed = true;
            self.open_iterators.set(self.open_iterators.get().saturating_sub(1));
        }
        Ok(())
    }
}
