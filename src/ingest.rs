mod retry;

#[cfg(test)]
mod tests;

pub use retry::RetryPolicy;

use crate::framer::LineFramer;
use crate::reading::parse_record;
use crate::state::BridgeState;
use crate::store::ReadingStore;
use retry::Backoff;
use serde::Serialize;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub read_buffer_bytes: usize,
    pub max_line_bytes: usize,
    pub retry: RetryPolicy,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            read_buffer_bytes: 128,
            max_line_bytes: 1024,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("telemetry source closed")]
    SourceClosed,
    #[error("telemetry read failed {failures} times in a row")]
    ReadFailuresExhausted {
        failures: u32,
        #[source]
        last: io::Error,
    },
}

#[derive(Debug, Default)]
pub struct IngestStats {
    pub records_accepted: AtomicU64,
    pub records_skipped: AtomicU64,
    pub records_rejected: AtomicU64,
    pub frames_dropped: AtomicU64,
    pub read_errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestCounters {
    pub records_accepted: u64,
    pub records_skipped: u64,
    pub records_rejected: u64,
    pub frames_dropped: u64,
    pub read_errors: u64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> IngestCounters {
        IngestCounters {
            records_accepted: self.records_accepted.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            records_rejected: self.records_rejected.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Sole writer of the [`ReadingStore`]: frames raw chunks, parses each record and
/// publishes every valid reading in arrival order. Bad input is logged and dropped.
pub struct TelemetryIngestor {
    store: ReadingStore,
    stats: Arc<IngestStats>,
    framer: LineFramer,
    settings: IngestSettings,
}

impl TelemetryIngestor {
    pub fn new(state: &BridgeState, settings: IngestSettings) -> Self {
        Self {
            store: state.store.clone(),
            stats: state.stats.clone(),
            framer: LineFramer::new(settings.max_line_bytes),
            settings,
        }
    }

    /// Returns the number of readings written to the store.
    pub fn ingest_chunk(&mut self, chunk: &[u8]) -> usize {
        let mut written = 0;
        for frame in self.framer.feed(chunk) {
            match frame {
                Ok(record) => {
                    if self.ingest_record(&record) {
                        written += 1;
                    }
                }
                Err(err) => {
                    IngestStats::bump(&self.stats.frames_dropped);
                    tracing::warn!(error=%err, "dropping oversized telemetry line");
                }
            }
        }
        written
    }

    fn ingest_record(&self, record: &str) -> bool {
        match parse_record(record) {
            Ok(Some(reading)) => {
                self.store.write(reading);
                IngestStats::bump(&self.stats.records_accepted);
                tracing::trace!(
                    vibration = reading.vibration,
                    amperage = reading.amperage,
                    "reading updated"
                );
                true
            }
            Ok(None) => {
                IngestStats::bump(&self.stats.records_skipped);
                false
            }
            Err(err) => {
                IngestStats::bump(&self.stats.records_rejected);
                tracing::warn!(error=%err, "rejected telemetry record");
                false
            }
        }
    }

    /// Pulls from `source` until it closes or keeps failing past the retry budget.
    /// Never returns `Ok`; the error says why ingestion stopped.
    pub async fn run<R>(mut self, mut source: R) -> Result<(), IngestError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; self.settings.read_buffer_bytes.max(1)];
        let mut backoff = Backoff::new(self.settings.retry);

        loop {
            match source.read(&mut buf).await {
                Ok(0) => {
                    if self.framer.pending_len() > 0 {
                        tracing::debug!(
                            pending = self.framer.pending_len(),
                            "discarding unterminated telemetry line at end of stream"
                        );
                    }
                    return Err(IngestError::SourceClosed);
                }
                Ok(n) => {
                    backoff.on_success();
                    self.ingest_chunk(&buf[..n]);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    IngestStats::bump(&self.stats.read_errors);
                    let Some(delay) = backoff.on_failure() else {
                        return Err(IngestError::ReadFailuresExhausted {
                            failures: backoff.failures(),
                            last: err,
                        });
                    };
                    tracing::warn!(
                        error=%err,
                        failures = backoff.failures(),
                        retry_in_ms = delay.as_millis() as u64,
                        "telemetry read failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
