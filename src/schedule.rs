use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};

/// one scheduled weekly installment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDue {
    week: u32,
    amount_due: Money,
    due_date: NaiveDate,
    paid: bool,
    payment_date: Option<NaiveDate>,
}

impl PaymentDue {
    pub fn new(week: u32, amount_due: Money, due_date: NaiveDate) -> Self {
        Self {
            week,
            amount_due,
            due_date,
            paid: false,
            payment_date: None,
        }
    }

    /// 0-based week index
    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn amount_due(&self) -> Money {
        self.amount_due
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn is_paid(&self) -> bool {
        self.paid
    }

    pub fn payment_date(&self) -> Option<NaiveDate> {
        self.payment_date
    }

    /// settle this installment; a paid installment keeps its first payment date
    pub(crate) fn mark_paid(&mut self, payment_date: NaiveDate) {
        if !self.paid {
            self.paid = true;
            self.payment_date = Some(payment_date);
        }
    }
}

/// ordered weekly schedule, one installment per week of the term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    installments: Vec<PaymentDue>,
}

impl PaymentSchedule {
    /// equal weekly installments, the first due a week after `start_date`
    ///
    /// Fails when a due date would fall outside the calendar range.
    pub fn weekly(term_weeks: u32, installment: Money, start_date: NaiveDate) -> Result<Self> {
        let installments = (0..term_weeks)
            .map(|week| {
                start_date
                    .checked_add_signed(Duration::weeks(week as i64 + 1))
                    .map(|due_date| PaymentDue::new(week, installment, due_date))
                    .ok_or_else(|| LoanError::InvalidInput {
                        message: format!("week {} of a loan starting {} has no due date", week, start_date),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { installments })
    }

    pub fn len(&self) -> usize {
        self.installments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installments.is_empty()
    }

    pub fn installments(&self) -> &[PaymentDue] {
        &self.installments
    }

    pub fn get(&self, week: u32) -> Option<&PaymentDue> {
        self.installments.get(week as usize)
    }

    /// oldest installment still unpaid
    pub fn earliest_unpaid(&self) -> Option<&PaymentDue> {
        self.installments.iter().find(|p| !p.is_paid())
    }

    pub(crate) fn earliest_unpaid_mut(&mut self) -> Option<&mut PaymentDue> {
        self.installments.iter_mut().find(|p| !p.is_paid())
    }

    /// unpaid installments with a week index strictly before `current_week`
    pub fn arrears_before(&self, current_week: i64) -> u32 {
        self.installments
            .iter()
            .take_while(|p| (p.week() as i64) < current_week)
            .filter(|p| !p.is_paid())
            .count() as u32
    }

    pub fn total_due(&self) -> Money {
        self.installments.iter().map(|p| p.amount_due()).sum()
    }

    pub fn total_paid(&self) -> Money {
        self.installments
            .iter()
            .filter(|p| p.is_paid())
            .map(|p| p.amount_due())
            .sum()
    }

    pub fn paid_count(&self) -> u32 {
        self.installments.iter().filter(|p| p.is_paid()).count() as u32
    }

    pub fn is_fully_paid(&self) -> bool {
        self.installments.iter().all(|p| p.is_paid())
    }

    pub fn last_due_date(&self) -> Option<NaiveDate> {
        self.installments.last().map(|p| p.due_date())
    }
}
