use serde::{Deserialize, Serialize};

use crate::errors::{LoanError, Result};
use crate::types::{InstallmentRounding, LoanStanding};

/// product configuration for a weekly installment loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    /// weeks that make up one billable month
    pub weeks_per_month: u32,
    pub months_per_year: u32,
    /// decimal places kept on the per-period interest rate (rounded up)
    pub rate_scale: u32,
    /// decimal places of the currency
    pub currency_scale: u32,
    pub installment_rounding: InstallmentRounding,
    pub standing: StandingThresholds,
}

/// arrears counts at which a loan changes standing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingThresholds {
    /// arrears count from which the loan is late
    pub late: u32,
    /// arrears count from which the loan is delinquent
    pub delinquent: u32,
}

impl StandingThresholds {
    /// classify an arrears count, ignoring the final-week override
    pub fn classify(&self, arrears: u32) -> LoanStanding {
        if arrears >= self.delinquent {
            LoanStanding::Delinquent
        } else if arrears >= self.late {
            LoanStanding::Late
        } else {
            LoanStanding::GoodStanding
        }
    }
}

impl Default for StandingThresholds {
    fn default() -> Self {
        Self {
            late: 1,
            delinquent: 2,
        }
    }
}

impl ProductConfig {
    /// consumptive weekly loan: four-week months, rate kept to 4 places, cents
    pub fn consumptive_weekly() -> Self {
        Self {
            name: "consumptive_weekly".to_string(),
            weeks_per_month: 4,
            months_per_year: 12,
            rate_scale: 4,
            currency_scale: 2,
            installment_rounding: InstallmentRounding::Up,
            standing: StandingThresholds::default(),
        }
    }

    /// load a product definition from json and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ProductConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.weeks_per_month == 0 {
            return Err(LoanError::invalid("weeks_per_month must be at least 1"));
        }

        if self.months_per_year == 0 {
            return Err(LoanError::invalid("months_per_year must be at least 1"));
        }

        if self.standing.late == 0 {
            return Err(LoanError::invalid("late threshold must be at least 1"));
        }

        if self.standing.delinquent <= self.standing.late {
            return Err(LoanError::InvalidInput {
                message: format!(
                    "delinquent threshold {} must exceed late threshold {}",
                    self.standing.delinquent, self.standing.late
                ),
            });
        }

        Ok(())
    }

    /// whole billable months covered by a term, rounded up
    pub fn months_for(&self, term_weeks: u32) -> u32 {
        term_weeks.div_ceil(self.weeks_per_month)
    }
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self::consumptive_weekly()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_months_round_up() {
        let config = ProductConfig::consumptive_weekly();

        assert_eq!(config.months_for(1), 1);
        assert_eq!(config.months_for(4), 1);
        assert_eq!(config.months_for(5), 2);
        assert_eq!(config.months_for(20), 5);
        assert_eq!(config.months_for(50), 13);
        assert_eq!(config.months_for(72), 18);
    }

    #[test]
    fn test_default_thresholds() {
        let thresholds = StandingThresholds::default();

        assert_eq!(thresholds.classify(0), LoanStanding::GoodStanding);
        assert_eq!(thresholds.classify(1), LoanStanding::Late);
        assert_eq!(thresholds.classify(2), LoanStanding::Delinquent);
        assert_eq!(thresholds.classify(9), LoanStanding::Delinquent);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = StandingThresholds { late: 2, delinquent: 4 };

        assert_eq!(thresholds.classify(1), LoanStanding::GoodStanding);
        assert_eq!(thresholds.classify(3), LoanStanding::Late);
        assert_eq!(thresholds.classify(4), LoanStanding::Delinquent);
    }

    #[test]
    fn test_json_round_trip_preserves_product() {
        let config = ProductConfig::consumptive_weekly();
        let json = config.to_json_pretty().unwrap();

        assert_eq!(ProductConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ProductConfig::consumptive_weekly();
        config.standing = StandingThresholds { late: 2, delinquent: 2 };
        assert!(matches!(config.validate(), Err(LoanError::InvalidInput { .. })));

        config.standing = StandingThresholds::default();
        config.weeks_per_month = 0;
        assert!(config.validate().is_err());

        let json = r#"{"name":"broken"}"#;
        assert!(matches!(ProductConfig::from_json(json), Err(LoanError::Serialization(_))));
    }
}
