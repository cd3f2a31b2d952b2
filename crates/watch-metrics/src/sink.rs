//! Time-series sink boundary

use crate::Result;
use watch_core::MetricRecord;

/// Trait implemented by time-series sinks.
///
/// A sink accepts qualified scalar records at high call rates and buffers
/// them internally; the writer must never be blocked under normal
/// operation. How (or whether) records become durable is entirely the
/// sink's business.
pub trait MetricSink: Send {
    /// Enqueue one scalar record.
    ///
    /// Infallible at this boundary: delivery problems are the sink's to log
    /// and drop, never the caller's to handle.
    fn write(&mut self, record: MetricRecord);

    /// Drain pending records, flush, and release the sink. Idempotent.
    fn flush_and_close(&mut self) -> Result<()>;
}
