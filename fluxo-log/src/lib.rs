//! fluxo-log - structured logging for the Fluxo engine
//!
//! Design rules, shared by every Fluxo crate:
//! - **Explicit passing**: no global logger; configuration travels through
//!   code as `Arc<Logger>`
//! - **Non-blocking**: sinks never make the caller wait; the ring buffer
//!   overwrites its oldest record when full
//! - **Capture-friendly**: [`LogRingBuffer`] keeps the last N records for
//!   diagnostics and tests
//!
//! # Quick start
//!
//! ```
//! use fluxo_log::{debug, Level, LogRingBuffer, Logger};
//!
//! let ring = LogRingBuffer::new(100);
//! let logger = Logger::new(Level::Debug).with_sink(ring.clone());
//! debug!(logger, "engine started");
//! assert_eq!(ring.dump_records().len(), 1);
//! ```

mod logger;
mod macros;
mod record;
mod ring_buffer;

pub use logger::{LogSink, Logger, StderrSink, StdoutSink};
pub use record::{Level, Record};
pub use ring_buffer::{LogRingBuffer, RingBufferStats};

// Macros are exported at the crate root via #[macro_export]:
// trace!, debug!, info!, warn!, error!, log!
