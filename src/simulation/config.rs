//! Validated configuration snapshot for one simulation

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aggregate::Granularity;
use crate::error::EngineError;
use crate::loan::{load_loans, Loan, YearMonth, MAX_SECONDARY_LOANS};
use crate::smoothing::SmoothingMode;

/// Everything one computation depends on
///
/// The primary loan's start month anchors the shared axis. A secondary loan
/// without a start month starts together with the primary loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub primary: Loan,

    #[serde(default)]
    pub secondary: Vec<Loan>,

    /// `None` disables smoothing
    #[serde(default)]
    pub smoothing: Option<SmoothingMode>,

    #[serde(default)]
    pub granularity: Granularity,
}

impl SimulationConfig {
    pub fn new(primary: Loan) -> Self {
        Self {
            primary,
            secondary: Vec::new(),
            smoothing: None,
            granularity: Granularity::Monthly,
        }
    }

    pub fn with_secondary(mut self, loan: Loan) -> Self {
        self.secondary.push(loan);
        self
    }

    pub fn with_smoothing(mut self, mode: SmoothingMode) -> Self {
        self.smoothing = Some(mode);
        self
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Start month of the shared axis, the current month if the primary has none
    pub fn anchor(&self) -> YearMonth {
        self.primary.start.unwrap_or_else(YearMonth::current)
    }

    /// Structural checks that clamping cannot repair
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.secondary.len() > MAX_SECONDARY_LOANS {
            return Err(EngineError::TooManySecondaryLoans {
                max: MAX_SECONDARY_LOANS,
                found: self.secondary.len(),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let reader = BufReader::new(File::open(path)?);
        let config: SimulationConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from a loans CSV file
    pub fn from_loans_csv<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let (primary, secondary) = load_loans(path)?;
        Ok(Self {
            secondary,
            ..Self::new(primary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::AmortizationStyle;

    #[test]
    fn test_from_json_with_defaults() {
        let json = r#"{
            "primary": {
                "principal": 300000,
                "annual_rate_pct": 3.5,
                "duration_months": 240,
                "start": "2026-01"
            },
            "secondary": [
                { "principal": 100000, "annual_rate_pct": 2.5, "duration_months": 120, "start": "2028-01" }
            ],
            "smoothing": "constant_duration",
            "granularity": "annual"
        }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();

        assert_eq!(config.anchor(), YearMonth::new(2026, 1).unwrap());
        assert_eq!(config.primary.style, AmortizationStyle::Amortizing);
        assert_eq!(config.primary.insurance_rate_pct, 0.0);
        assert_eq!(config.smoothing, Some(SmoothingMode::ConstantDuration));
        assert_eq!(config.granularity, Granularity::Annual);
        assert_eq!(config.secondary[0].start, YearMonth::new(2028, 1));
    }

    #[test]
    fn test_anchor_is_primary_start() {
        let start = YearMonth::new(2030, 6).unwrap();
        let config = SimulationConfig::new(Loan::amortizing(1.0, 1.0, 12).starting(start));
        assert_eq!(config.anchor(), start);
    }

    #[test]
    fn test_rejects_three_secondary_loans() {
        let mut config = SimulationConfig::new(Loan::amortizing(1.0, 1.0, 12));
        for _ in 0..3 {
            config = config.with_secondary(Loan::amortizing(1.0, 1.0, 12));
        }
        assert!(matches!(
            config.validate(),
            Err(EngineError::TooManySecondaryLoans { max: 2, found: 3 })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            SimulationConfig::from_json_str("{\"primary\": 3}"),
            Err(EngineError::Json(_))
        ));
        let bad_month = r#"{"primary": {"principal": 1, "annual_rate_pct": 1, "duration_months": 12, "start": "2026-13"}}"#;
        assert!(SimulationConfig::from_json_str(bad_month).is_err());
    }
}
