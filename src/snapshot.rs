use crate::reading::SensorReading;
use crate::state::BridgeState;
use crate::status::{OperatingState, Thresholds};
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Response body of `GET /data`. Built fresh for every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub amperage: f64,
    pub vibration: bool,
    pub status: OperatingState,
    pub timestamp: String,
}

impl Snapshot {
    pub fn from_reading<Tz>(reading: SensorReading, thresholds: &Thresholds, at: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            amperage: reading.amperage,
            vibration: reading.vibration,
            status: thresholds.classify(reading.amperage),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn capture(state: &BridgeState) -> Self {
        Self::from_reading(state.store.read(), &state.thresholds, Local::now())
    }
}
