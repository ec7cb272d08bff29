use super::{IngestError, IngestSettings, RetryPolicy, TelemetryIngestor};
use crate::reading::SensorReading;
use crate::snapshot::Snapshot;
use crate::state::BridgeState;
use crate::status::{OperatingState, Thresholds};
use std::io;
use std::time::Duration;
use tokio_test::io::Builder;

fn bridge_state() -> BridgeState {
    BridgeState::new(Thresholds::new(5.0, 20.0).unwrap())
}

fn settings(max_failures: u32) -> IngestSettings {
    IngestSettings {
        read_buffer_bytes: 8,
        max_line_bytes: 64,
        retry: RetryPolicy {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(1),
            max_failures,
        },
    }
}

fn transient() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "device hiccup")
}

#[test]
fn queries_track_each_line_in_order() {
    let state = bridge_state();
    let mut ingestor = TelemetryIngestor::new(&state, settings(3));

    let before = Snapshot::capture(&state);
    assert_eq!(before.amperage, 0.0);
    assert!(!before.vibration);
    assert_eq!(before.status, OperatingState::Off);

    let mut seen = Vec::new();
    for line in ["N 2\n", "Y 10\n", "Y 25\n"] {
        assert_eq!(ingestor.ingest_chunk(line.as_bytes()), 1);
        let snapshot = Snapshot::capture(&state);
        seen.push((snapshot.status, snapshot.vibration));
    }
    assert_eq!(
        seen,
        vec![
            (OperatingState::Off, false),
            (OperatingState::Running, true),
            (OperatingState::Malfunctioning, true),
        ]
    );
}

#[test]
fn bad_records_are_dropped_without_touching_the_store() {
    let state = bridge_state();
    let mut ingestor = TelemetryIngestor::new(&state, settings(3));

    ingestor.ingest_chunk(b"Y 12.5\n");
    let written = ingestor.ingest_chunk(b"garbage line here\nY notanumber\nX 5\nY\n# note\n\n");
    assert_eq!(written, 0);
    assert_eq!(
        state.store.read(),
        SensorReading {
            vibration: true,
            amperage: 12.5
        }
    );

    ingestor.ingest_chunk(b"N 7\n");
    assert_eq!(state.store.read().amperage, 7.0);

    let counters = state.stats.counters();
    assert_eq!(counters.records_accepted, 2);
    assert_eq!(counters.records_rejected, 4);
    assert_eq!(counters.records_skipped, 2);
}

#[test]
fn oversized_line_is_counted_and_stream_recovers() {
    let state = bridge_state();
    let mut ingestor = TelemetryIngestor::new(
        &state,
        IngestSettings {
            max_line_bytes: 8,
            ..settings(3)
        },
    );
    ingestor.ingest_chunk(b"Y 1234567890123\nN 3\n");
    assert_eq!(state.stats.counters().frames_dropped, 1);
    assert_eq!(state.store.read().amperage, 3.0);
}

#[tokio::test]
async fn run_reassembles_split_reads_until_source_closes() {
    let state = bridge_state();
    let source = Builder::new()
        .read(b"# sensor boot\nN ")
        .read(b"2\nY 1")
        .read(b"0\r\nY 25")
        .read(b"\n")
        .build();

    let result = TelemetryIngestor::new(&state, settings(3)).run(source).await;
    assert!(matches!(result, Err(IngestError::SourceClosed)));

    let snapshot = Snapshot::capture(&state);
    assert_eq!(snapshot.amperage, 25.0);
    assert!(snapshot.vibration);
    assert_eq!(snapshot.status, OperatingState::Malfunctioning);
    assert_eq!(state.stats.counters().records_accepted, 3);
    assert_eq!(state.stats.counters().records_skipped, 1);
}

#[tokio::test(start_paused = true)]
async fn transient_read_errors_are_retried() {
    let state = bridge_state();
    let source = Builder::new()
        .read(b"Y 6\n")
        .read_error(transient())
        .read_error(transient())
        .read(b"N 30\n")
        .build();

    let result = TelemetryIngestor::new(&state, settings(3)).run(source).await;
    assert!(matches!(result, Err(IngestError::SourceClosed)));
    assert_eq!(state.stats.counters().read_errors, 2);
    assert_eq!(
        state.store.read(),
        SensorReading {
            vibration: false,
            amperage: 30.0
        }
    );
}

#[tokio::test(start_paused = true)]
async fn successful_read_resets_failure_budget() {
    let state = bridge_state();
    let source = Builder::new()
        .read_error(transient())
        .read_error(transient())
        .read(b"Y 8\n")
        .read_error(transient())
        .read_error(transient())
        .read(b"Y 9\n")
        .build();

    let result = TelemetryIngestor::new(&state, settings(3)).run(source).await;
    assert!(matches!(result, Err(IngestError::SourceClosed)));
    assert_eq!(state.store.read().amperage, 9.0);
    assert_eq!(state.stats.counters().read_errors, 4);
}

#[tokio::test(start_paused = true)]
async fn persistent_read_errors_stop_ingestion() {
    let state = bridge_state();
    state.store.write(SensorReading {
        vibration: true,
        amperage: 11.0,
    });
    let source = Builder::new()
        .read_error(transient())
        .read_error(transient())
        .read_error(transient())
        .build();

    let result = TelemetryIngestor::new(&state, settings(3)).run(source).await;
    match result {
        Err(IngestError::ReadFailuresExhausted { failures, last }) => {
            assert_eq!(failures, 3);
            assert_eq!(last.to_string(), "device hiccup");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    // Last good reading stays visible to callers.
    assert_eq!(Snapshot::capture(&state).amperage, 11.0);
}
