use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Taxpayer age group. Determines the basic exemption threshold and the
/// health-insurance deduction cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBracket {
    Under60,
    SixtyToEighty,
    Over80,
}

impl AgeBracket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Under60 => "below60",
            Self::SixtyToEighty => "60to80",
            Self::Over80 => "above80",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "below60" => Some(Self::Under60),
            "60to80" => Some(Self::SixtyToEighty),
            "above80" => Some(Self::Over80),
            _ => None,
        }
    }

    /// Income threshold below which no tax applies for this bracket.
    pub fn basic_exemption(&self) -> Decimal {
        match self {
            Self::Under60 => Decimal::from(250_000),
            Self::SixtyToEighty => Decimal::from(300_000),
            Self::Over80 => Decimal::from(500_000),
        }
    }

    /// Senior brackets qualify for the raised health-insurance cap.
    pub fn is_senior(&self) -> bool {
        matches!(self, Self::SixtyToEighty | Self::Over80)
    }
}
