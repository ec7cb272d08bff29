use serde::Serialize;
use thiserror::Error;

/// Machine state derived from amperage. Variants are ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingState {
    Off,
    Running,
    Malfunctioning,
}

impl OperatingState {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatingState::Off => "off",
            OperatingState::Running => "running",
            OperatingState::Malfunctioning => "malfunctioning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("amperage thresholds must be finite (running_min={running_min}, malfunction_min={malfunction_min})")]
    NotFinite {
        running_min: f64,
        malfunction_min: f64,
    },
    #[error("running minimum ({running_min} A) must be lower than malfunction minimum ({malfunction_min} A)")]
    Inverted {
        running_min: f64,
        malfunction_min: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    running_min: f64,
    malfunction_min: f64,
}

impl Thresholds {
    pub fn new(running_min: f64, malfunction_min: f64) -> Result<Self, ThresholdError> {
        if !running_min.is_finite() || !malfunction_min.is_finite() {
            return Err(ThresholdError::NotFinite {
                running_min,
                malfunction_min,
            });
        }
        if running_min >= malfunction_min {
            return Err(ThresholdError::Inverted {
                running_min,
                malfunction_min,
            });
        }
        Ok(Self {
            running_min,
            malfunction_min,
        })
    }

    pub fn running_min(&self) -> f64 {
        self.running_min
    }

    pub fn malfunction_min(&self) -> f64 {
        self.malfunction_min
    }

    // Boundaries resolve toward the more severe state.
    pub fn classify(&self, amperage: f64) -> OperatingState {
        if amperage >= self.malfunction_min {
            OperatingState::Malfunctioning
        } else if amperage >= self.running_min {
            OperatingState::Running
        } else {
            OperatingState::Off
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds::new(5.0, 20.0).unwrap()
    }

    #[test]
    fn boundaries_favor_more_severe_state() {
        let t = thresholds();
        assert_eq!(t.classify(20.0), OperatingState::Malfunctioning);
        assert_eq!(t.classify(5.0), OperatingState::Running);
        assert_eq!(t.classify(5.0 - f64::EPSILON * 8.0), OperatingState::Off);
        assert_eq!(t.classify(19.999), OperatingState::Running);
    }

    #[test]
    fn covers_whole_range() {
        let t = thresholds();
        assert_eq!(t.classify(-3.0), OperatingState::Off);
        assert_eq!(t.classify(0.0), OperatingState::Off);
        assert_eq!(t.classify(12.0), OperatingState::Running);
        assert_eq!(t.classify(1e9), OperatingState::Malfunctioning);
    }

    #[test]
    fn classification_is_monotonic_in_amperage() {
        let t = Thresholds::new(0.5, 1.5).unwrap();
        let mut last = OperatingState::Off;
        for step in 0..400 {
            let state = t.classify(step as f64 * 0.01);
            assert!(state >= last);
            last = state;
        }
        assert_eq!(last, OperatingState::Malfunctioning);
    }

    #[test]
    fn rejects_inverted_or_equal_thresholds() {
        assert!(matches!(
            Thresholds::new(20.0, 5.0),
            Err(ThresholdError::Inverted { .. })
        ));
        assert!(matches!(
            Thresholds::new(5.0, 5.0),
            Err(ThresholdError::Inverted { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_thresholds() {
        assert!(matches!(
            Thresholds::new(f64::NAN, 5.0),
            Err(ThresholdError::NotFinite { .. })
        ));
        assert!(matches!(
            Thresholds::new(1.0, f64::INFINITY),
            Err(ThresholdError::NotFinite { .. })
        ));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OperatingState::Malfunctioning).unwrap(),
            "\"malfunctioning\""
        );
        assert_eq!(OperatingState::Running.as_str(), "running");
    }
}
