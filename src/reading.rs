use thiserror::Error;

const COMMENT_PREFIX: char = '#';

/// One decoded sensor line. The default is the zero reading served before any data arrives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    pub vibration: bool,
    pub amperage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed record (expected 2 fields, got {fields}): {record}")]
    MalformedRecord { record: String, fields: usize },
    #[error("invalid vibration field: {0}")]
    InvalidVibrationField(String),
    #[error("invalid amperage field: {0}")]
    InvalidAmperageField(String),
}

/// Decodes a `<Y|N> <amps>` record.
///
/// Blank records and `#` comments yield `Ok(None)`.
pub fn parse_record(record: &str) -> Result<Option<SensorReading>, ParseError> {
    let line = record.trim();
    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    let [vibration, amperage] = fields.as_slice() else {
        return Err(ParseError::MalformedRecord {
            record: line.to_string(),
            fields: fields.len(),
        });
    };

    let vibration = match *vibration {
        "Y" => true,
        "N" => false,
        other => return Err(ParseError::InvalidVibrationField(other.to_string())),
    };

    let amperage = amperage
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseError::InvalidAmperageField(amperage.to_string()))?;

    Ok(Some(SensorReading {
        vibration,
        amperage,
    }))
}
