/// serialization support for loans
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::loan::Loan;
use crate::schedule::PaymentDue;
use crate::types::{LoanId, LoanStanding};

/// serializable view of a loan for back-office inspection
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub standing: LoanStanding,
    pub financial: FinancialView,
    pub term: TermView,
    pub schedule: Vec<InstallmentView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinancialView {
    pub principal: Money,
    pub annual_rate: Rate,
    pub interest: Money,
    pub total_amount: Money,
    pub weekly_installment: Money,
    pub total_paid: Money,
    pub outstanding: Money,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TermView {
    pub term_weeks: u32,
    pub paid_weeks: u32,
    pub start_date: NaiveDate,
    pub first_payment_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub next_due_week: Option<u32>,
    pub next_due_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstallmentView {
    pub week: u32,
    pub due_date: NaiveDate,
    pub amount_due: Money,
    pub paid: bool,
    pub payment_date: Option<NaiveDate>,
}

impl From<&PaymentDue> for InstallmentView {
    fn from(due: &PaymentDue) -> Self {
        InstallmentView {
            week: due.week(),
            due_date: due.due_date(),
            amount_due: due.amount_due(),
            paid: due.is_paid(),
            payment_date: due.payment_date(),
        }
    }
}

impl LoanView {
    pub fn from_loan(loan: &Loan) -> Self {
        let next_due = loan.next_payment_due();

        LoanView {
            id: loan.id().to_string(),
            standing: loan.standing(),
            financial: FinancialView {
                principal: loan.principal(),
                annual_rate: loan.annual_rate(),
                interest: loan.interest(),
                total_amount: loan.total_amount(),
                weekly_installment: loan.weekly_installment(),
                total_paid: loan.total_paid(),
                outstanding: loan.outstanding(),
            },
            term: TermView {
                term_weeks: loan.term_weeks(),
                paid_weeks: loan.paid_weeks(),
                start_date: loan.start_date(),
                first_payment_date: loan.first_payment_date(),
                maturity_date: loan.maturity_date(),
                next_due_week: next_due.map(|p| p.week()),
                next_due_date: next_due.map(|p| p.due_date()),
            },
            schedule: loan
                .schedule()
                .installments()
                .iter()
                .map(InstallmentView::from)
                .collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
