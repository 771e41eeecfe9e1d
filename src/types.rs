use serde::{Deserialize, Serialize};
use std::fmt;

/// unique identifier for a loan
pub type LoanId = String;

/// loan standing, derived from arrears at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LoanStanding {
    /// nothing in arrears
    #[default]
    GoodStanding,
    /// one past-due installment unpaid
    Late,
    /// two or more past-due installments unpaid
    Delinquent,
    /// final week reached with nothing in arrears
    Closed,
}

impl LoanStanding {
    /// ordering used to tell deterioration from improvement in logs
    pub(crate) fn severity(&self) -> u8 {
        match self {
            LoanStanding::Closed => 0,
            LoanStanding::GoodStanding => 1,
            LoanStanding::Late => 2,
            LoanStanding::Delinquent => 3,
        }
    }
}

impl fmt::Display for LoanStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoanStanding::GoodStanding => "GOOD_STANDING",
            LoanStanding::Late => "LATE",
            LoanStanding::Delinquent => "DELINQUENT",
            LoanStanding::Closed => "CLOSED",
        };
        f.write_str(label)
    }
}

/// rounding applied when splitting the total into weekly installments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InstallmentRounding {
    /// round towards positive infinity, lender never loses a fraction
    #[default]
    Up,
    /// round half away from zero
    HalfUp,
}
