//! JSON-lines scalar sink with a bounded drop-oldest queue

use crate::sink::MetricSink;
use crate::{MetricsError, Result};

use crossbeam::queue::ArrayQueue;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::warn;
use watch_core::MetricRecord;

/// One serialized line of the scalar file
#[derive(Debug, Serialize)]
struct ScalarRow {
    name: String,
    value: f64,
    step: u64,
    /// Fractional epoch seconds, stamped when the record was enqueued
    wall_time: f64,
}

/// Appends scalar records as JSON lines to a file.
///
/// Writes go through a bounded in-memory queue drained by a background
/// thread, so the caller never blocks on file I/O. When the queue is full
/// the oldest pending record is displaced: the training loop's forward
/// progress wins over completeness of telemetry. Displaced records are
/// counted and reported once at close time.
pub struct JsonlSink {
    queue: Arc<ArrayQueue<ScalarRow>>,
    shutdown: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    writer: Option<JoinHandle<()>>,
    path: PathBuf,
}

impl JsonlSink {
    /// Create the scalar file (and any missing parent directories) and
    /// start the writer thread.
    ///
    /// Any I/O failure here is [`MetricsError::SinkInit`]: an unwritable
    /// destination is a configuration problem worth surfacing before the
    /// workload proceeds.
    pub fn create(path: &Path, queue_capacity: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MetricsError::SinkInit(format!(
                    "cannot create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let file = File::create(path).map_err(|e| {
            MetricsError::SinkInit(format!("cannot open {}: {}", path.display(), e))
        })?;

        let queue = Arc::new(ArrayQueue::new(queue_capacity));
        let shutdown = Arc::new(AtomicBool::new(false));

        let writer_queue = Arc::clone(&queue);
        let writer_shutdown = Arc::clone(&shutdown);
        let writer = thread::spawn(move || {
            drain_rows(file, &writer_queue, &writer_shutdown);
        });

        Ok(Self {
            queue,
            shutdown,
            dropped: Arc::new(AtomicU64::new(0)),
            writer: Some(writer),
            path: path.to_path_buf(),
        })
    }

    /// Path of the scalar file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Background writer loop: drains the queue into the file, exits once
/// shutdown is signalled and the queue is empty.
fn drain_rows(file: File, queue: &ArrayQueue<ScalarRow>, shutdown: &AtomicBool) {
    let mut out = BufWriter::new(file);

    loop {
        if let Some(row) = queue.pop() {
            match serde_json::to_string(&row) {
                Ok(line) => {
                    if let Err(e) = writeln!(out, "{}", line) {
                        warn!("failed to write metric record: {}", e);
                    }
                }
                Err(e) => warn!("failed to serialize metric record: {}", e),
            }
        } else if shutdown.load(Ordering::Acquire) {
            break;
        } else {
            // Avoid busy-waiting while the queue is empty
            thread::sleep(Duration::from_millis(1));
        }
    }

    if let Err(e) = out.flush() {
        warn!("failed to flush metric records: {}", e);
    }
}

impl MetricSink for JsonlSink {
    fn write(&mut self, record: MetricRecord) {
        let now = chrono::Utc::now();
        let row = ScalarRow {
            name: record.name,
            value: record.value,
            step: record.step,
            wall_time: now.timestamp() as f64
                + f64::from(now.timestamp_subsec_micros()) / 1e6,
        };

        if self.queue.force_push(row).is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn flush_and_close(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            self.shutdown.store(true, Ordering::Release);
            if writer.join().is_err() {
                warn!("metric writer thread panicked");
            }

            let dropped = self.dropped.load(Ordering::Relaxed);
            if dropped > 0 {
                warn!(
                    "{} metric records dropped by {} (queue full)",
                    dropped,
                    self.path.display()
                );
            }
        }
        Ok(())
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        let _ = self.flush_and_close();
    }
}
