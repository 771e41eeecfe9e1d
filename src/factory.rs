use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ProductConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::schedule::PaymentSchedule;
use crate::types::InstallmentRounding;

/// longest accepted term, a hundred years of weekly installments
pub const MAX_TERM_WEEKS: u32 = 5_200;

/// turns origination inputs into a loan with a fixed schedule
pub trait LoanFactory {
    fn create_loan(
        &self,
        loan_id: &str,
        principal: Money,
        annual_rate: Rate,
        term_weeks: u32,
        start_date: NaiveDate,
    ) -> Result<Loan>;
}

/// derived origination numbers for a flat-rate weekly loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginationTerms {
    pub term_weeks: u32,
    /// billable months, the term rounded up to whole months
    pub months: u32,
    /// flat rate charged over the whole term
    pub period_rate: Rate,
    pub interest: Money,
    /// total repayable, equal to `weekly_installment * term_weeks`
    pub total_amount: Money,
    pub weekly_installment: Money,
}

impl OriginationTerms {
    /// run the flat-rate calculation for a product
    pub fn calculate(
        principal: Money,
        annual_rate: Rate,
        term_weeks: u32,
        config: &ProductConfig,
    ) -> Result<Self> {
        if term_weeks == 0 {
            return Err(LoanError::invalid("term must be at least one week"));
        }

        if term_weeks > MAX_TERM_WEEKS {
            return Err(LoanError::InvalidInput {
                message: format!("term of {} weeks exceeds {} weeks", term_weeks, MAX_TERM_WEEKS),
            });
        }

        if principal.is_negative() {
            return Err(LoanError::InvalidInput {
                message: format!("principal must not be negative: {}", principal),
            });
        }

        if annual_rate.is_negative() {
            return Err(LoanError::InvalidInput {
                message: format!("annual rate must not be negative: {}", annual_rate),
            });
        }

        let months = config.months_for(term_weeks);
        let overflow = || LoanError::InvalidInput {
            message: format!(
                "{} at {} over {} weeks is out of range",
                principal, annual_rate, term_weeks
            ),
        };

        let period_rate = annual_rate
            .for_months(months, config.months_per_year, config.rate_scale)
            .ok_or_else(overflow)?;
        let interest = principal
            .apply_rate(period_rate)
            .ok_or_else(overflow)?
            .round_half_up(config.currency_scale);
        let unrounded = principal
            .checked_add(interest)
            .and_then(|total| total.split(term_weeks))
            .ok_or_else(overflow)?;

        let weekly_installment = match config.installment_rounding {
            InstallmentRounding::Up => unrounded.round_up(config.currency_scale),
            InstallmentRounding::HalfUp => unrounded.round_half_up(config.currency_scale),
        };

        // rounding remainder goes into the total, never into the last installment
        let total_amount = weekly_installment.checked_times(term_weeks).ok_or_else(overflow)?;

        Ok(Self {
            term_weeks,
            months,
            period_rate,
            interest,
            total_amount,
            weekly_installment,
        })
    }
}

/// weekly installments with flat interest on the original principal
#[derive(Debug, Clone, Default)]
pub struct FlatRateWeeklyFactory {
    config: ProductConfig,
}

impl FlatRateWeeklyFactory {
    pub fn new() -> Self {
        Self {
            config: ProductConfig::consumptive_weekly(),
        }
    }

    pub fn with_config(config: ProductConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ProductConfig {
        &self.config
    }

    /// origination numbers without building a loan
    pub fn quote(&self, principal: Money, annual_rate: Rate, term_weeks: u32) -> Result<OriginationTerms> {
        OriginationTerms::calculate(principal, annual_rate, term_weeks, &self.config)
    }
}

impl LoanFactory for FlatRateWeeklyFactory {
    fn create_loan(
        &self,
        loan_id: &str,
        principal: Money,
        annual_rate: Rate,
        term_weeks: u32,
        start_date: NaiveDate,
    ) -> Result<Loan> {
        if loan_id.trim().is_empty() {
            return Err(LoanError::invalid("loan id must not be empty"));
        }

        let terms = self.quote(principal, annual_rate, term_weeks)?;
        let schedule = PaymentSchedule::weekly(term_weeks, terms.weekly_installment, start_date)?;

        info!(
            "originating loan {}: principal {} at {} over {} weeks ({} months), total {}, weekly {}",
            loan_id,
            principal,
            annual_rate,
            term_weeks,
            terms.months,
            terms.total_amount,
            terms.weekly_installment
        );

        Ok(Loan::originate(
            loan_id.to_string(),
            principal,
            annual_rate,
            start_date,
            &terms,
            schedule,
            self.config.standing,
        ))
    }
}
