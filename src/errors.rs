use thiserror::Error;

use crate::decimal::Money;
use crate::types::LoanId;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    #[error("loan not found: {loan_id}")]
    NotFound {
        loan_id: LoanId,
    },

    #[error("loan already exists: {loan_id}")]
    DuplicateId {
        loan_id: LoanId,
    },

    #[error("loan already settled: {loan_id} has no unpaid installment")]
    AlreadySettled {
        loan_id: LoanId,
    },

    #[error("payment not yet due: week {week} is ahead of current week {current_week}")]
    NotYetDue {
        week: u32,
        current_week: i64,
    },

    #[error("wrong payment amount: expected {expected}, provided {provided}")]
    WrongAmount {
        expected: Money,
        provided: Money,
    },

    #[error("clock cannot be advanced outside test mode")]
    ClockNotSimulated,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LoanError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
