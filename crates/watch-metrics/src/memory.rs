//! In-memory capture sink for testing

use crate::sink::MetricSink;
use crate::Result;
use std::sync::{Arc, Mutex};
use watch_core::MetricRecord;

/// Sink that records everything written to it.
///
/// Cloning yields a handle onto the same captured state, so a test can hand
/// one handle to an emitter and inspect the records through another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<MetricRecord>>>,
    closes: Arc<Mutex<u32>>,
}

impl MemorySink {
    /// Create an empty capture sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records written so far
    pub fn records(&self) -> Vec<MetricRecord> {
        self.records.lock().unwrap().clone()
    }

    /// How many times `flush_and_close` ran
    pub fn close_count(&self) -> u32 {
        *self.closes.lock().unwrap()
    }
}

impl MetricSink for MemorySink {
    fn write(&mut self, record: MetricRecord) {
        self.records.lock().unwrap().push(record);
    }

    fn flush_and_close(&mut self) -> Result<()> {
        *self.closes.lock().unwrap() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_inspect() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();

        writer.write(MetricRecord::new("loss", 1.0, 1));
        writer.write(MetricRecord::new("loss", 0.5, 2));

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].value, 0.5);
    }
}
