//! Ring-buffer log sink
//!
//! Bounded capture of the most recent records. When the buffer is full the
//! oldest record is overwritten, so logging never blocks and never grows
//! without bound. Used for diagnostics capture in tests and crash reports.

use crate::logger::LogSink;
use crate::record::Record;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Bounded in-memory log sink
///
/// Cloning shares the underlying buffer, so a clone handed to a logger and
/// a clone kept by the caller observe the same records.
#[derive(Clone)]
pub struct LogRingBuffer {
    inner: Arc<Mutex<RingInner>>,
}

struct RingInner {
    records: VecDeque<Record>,
    capacity: usize,
    dropped: u64,
}

/// Counters describing buffer pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingBufferStats {
    /// Records currently held
    pub len: usize,
    /// Configured capacity
    pub capacity: usize,
    /// Records overwritten since creation
    pub dropped: u64,
}

impl LogRingBuffer {
    /// Create a buffer holding at most `capacity` records
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RingInner {
                records: VecDeque::with_capacity(capacity),
                capacity: capacity.max(1),
                dropped: 0,
            })),
        }
    }

    /// Copy out every record currently held, oldest first
    pub fn dump_records(&self) -> Vec<Record> {
        let inner = self.inner.lock().expect("ring buffer lock");
        inner.records.iter().cloned().collect()
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.inner.lock().expect("ring buffer lock").records.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all held records
    pub fn clear(&self) {
        self.inner.lock().expect("ring buffer lock").records.clear();
    }

    /// Buffer pressure counters
    pub fn stats(&self) -> RingBufferStats {
        let inner = self.inner.lock().expect("ring buffer lock");
        RingBufferStats {
            len: inner.records.len(),
            capacity: inner.capacity,
            dropped: inner.dropped,
        }
    }
}

impl LogSink for LogRingBuffer {
    fn write(&self, record: &Record) {
        let mut inner = self.inner.lock().expect("ring buffer lock");
        if inner.records.len() == inner.capacity {
            inner.records.pop_front();
            inner.dropped += 1;
        }
        inner.records.push_back(record.clone());
    }
}
