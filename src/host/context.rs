//! Transaction context handed to every contract operation
//!
//! The host ledger owns consensus, ordering and atomic commit. The contract
//! only sees this narrow surface, injected per call.

use std::fmt;

use super::composite;
use super::errors::HostResult;

/// A single key/value pair returned by range iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// Commit time assigned by the host's ordering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TxTimestamp {
    /// Seconds since the Unix epoch
    pub seconds: i64,
    /// Sub-second nanoseconds (0..1_000_000_000)
    pub nanos: u32,
}

impl TxTimestamp {
    pub fn new(seconds: i64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }
}

impl fmt::Display for TxTimestamp {
    /// `<seconds>.<nanos>` with nanoseconds zero-padded to 9 digits
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

/// Host-side cursor over a key range.
pub trait StateIterator {
    /// Advance the cursor. `Ok(None)` marks the end of the range.
    fn next_entry(&mut self) -> HostResult<Option<KeyValue>>;

    /// Release the host resource backing this cursor.
    fn close(&mut self) -> HostResult<()>;
}

/// Owns a `StateIterator` and closes it exactly once, on `close` or on drop.
///
/// Every exit path out of a scan (early return, `?`, panic unwinding)
/// therefore releases the host cursor.
pub struct ScopedIterator<'a> {
    inner: Box<dyn StateIterator + 'a>,
    closed: bool,
}

impl<'a> ScopedIterator<'a> {
    pub fn new(inner: Box<dyn StateIterator + 'a>) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Advance the underlying cursor.
    pub fn next_entry(&mut self) -> HostResult<Option<KeyValue>> {
        if self.closed {
            return Ok(None);
        }
        self.inner.next_entry()
    }

    /// Close explicitly, surfacing any error from the host.
    pub fn close(mut self) -> HostResult<()> {
        self.closed = true;
        self.inner.close()
    }
}

impl Iterator for ScopedIterator<'_> {
    type Item = HostResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

impl Drop for ScopedIterator<'_> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            // Nowhere to report a close failure from drop
            let _ = self.inner.close();
        }
    }
}

/// Per-transaction view of the host ledger.
///
/// Reads observe committed state. Writes are staged by the host and become
/// visible only if the whole transaction commits.
pub trait TransactionContext {
    /// Point read. `Ok(None)` when the key has no value.
    fn get_state(&self, key: &str) -> HostResult<Option<Vec<u8>>>;

    /// Point write.
    fn put_state(&mut self, key: &str, value: &[u8]) -> HostResult<()>;

    /// Every entry whose composite key starts with `namespace` + `prefix`,
    /// in ascending key order.
    fn state_by_partial_composite_key(
        &self,
        namespace: &str,
        prefix: &[&str],
    ) -> HostResult<ScopedIterator<'_>>;

    /// Identifier of the enclosing transaction.
    fn tx_id(&self) -> String;

    /// Consensus timestamp of the enclosing transaction.
    fn tx_timestamp(&self) -> HostResult<TxTimestamp>;

    fn create_composite_key(&self, namespace: &str, components: &[&str]) -> HostResult<String> {
        composite::create_composite_key(namespace, components)
    }

    fn split_composite_key(&self, key: &str) -> HostResult<(String, Vec<String>)> {
        composite::split_composite_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingIterator<'a> {
        remaining: u32,
        closes: &'a Cell<u32>,
    }

    impl StateIterator for CountingIterator<'_> {
        fn next_entry(&mut self) -> HostResult<Option<KeyValue>> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(KeyValue {
                key: format!("k{}", self.remaining),
                value: vec![0],
            }))
        }

        fn close(&mut self) -> HostResult<()> {
            self.closes.set(self.closes.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(TxTimestamp::new(1700000000, 5).to_string(), "1700000000.000000005");
        assert_eq!(TxTimestamp::new(12, 123456789).to_string(), "12.123456789");
        assert_eq!(TxTimestamp::new(0, 0).to_string(), "0.000000000");
    }

    #[test]
    fn test_scoped_iterator_closes_on_drop() {
        let closes = Cell::new(0);
        {
            let mut iter = ScopedIterator::new(Box::new(CountingIterator {
                remaining: 3,
                closes: &closes,
            }));
            assert!(iter.next_entry().unwrap().is_some());
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_scoped_iterator_closes_once() {
        let closes = Cell::new(0);
        let iter = ScopedIterator::new(Box::new(CountingIterator {
            remaining: 1,
            closes: &closes,
        }));
        iter.close().unwrap();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_scoped_iterator_as_iterator() {
        let closes = Cell::new(0);
        let iter = ScopedIterator::new(Box::new(CountingIterator {
            remaining: 2,
            closes: &closes,
        }));
        let keys: Vec<String> = iter.map(|kv| kv.unwrap().key).collect();
        assert_eq!(keys, vec!["k1".to_string(), "k0".to_string()]);
        assert_eq!(closes.get(), 1);
    }
}
