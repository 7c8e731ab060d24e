use serde::{Deserialize, Serialize};

/// The tri-state decision a strategy emits for a single bar.
///
/// The discriminants double as the position the engine holds on the next
/// bar: long (+1), short (-1) or flat (0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    Buy = 1,
    Sell = -1,
    #[default]
    Hold = 0,
}

impl Signal {
    /// Returns the signed exposure this signal represents.
    pub fn position(&self) -> f64 {
        f64::from(*self as i8)
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal as i8
    }
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Signal::Buy),
            -1 => Ok(Signal::Sell),
            0 => Ok(Signal::Hold),
            other => Err(format!("{} is not a valid signal (expected -1, 0 or 1)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Signal::Sell).unwrap(), "-1");
        let parsed: Signal = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Signal::Buy);
        assert!(serde_json::from_str::<Signal>("2").is_err());
    }

    #[test]
    fn test_signal_position() {
        assert_eq!(Signal::Buy.position(), 1.0);
        assert_eq!(Signal::Sell.position(), -1.0);
        assert_eq!(Signal::Hold.position(), 0.0);
    }
}
