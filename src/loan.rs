use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::StandingThresholds;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::factory::OriginationTerms;
use crate::schedule::{PaymentDue, PaymentSchedule};
use crate::types::{LoanId, LoanStanding};

/// flat-rate weekly installment loan
///
/// The schedule is fixed at origination. Afterwards the loan only changes
/// through [`Loan::make_payment`], which settles exactly one installment, and
/// [`Loan::update_status`], which re-derives the standing for a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    id: LoanId,
    principal: Money,
    annual_rate: Rate,
    interest: Money,
    total_amount: Money,
    weekly_installment: Money,
    term_weeks: u32,
    start_date: NaiveDate,
    first_payment_date: NaiveDate,
    schedule: PaymentSchedule,
    outstanding: Money,
    standing: LoanStanding,
    thresholds: StandingThresholds,
    #[serde(skip)]
    events: EventStore,
}

impl Loan {
    /// build a loan from computed origination terms
    pub(crate) fn originate(
        id: LoanId,
        principal: Money,
        annual_rate: Rate,
        start_date: NaiveDate,
        terms: &OriginationTerms,
        schedule: PaymentSchedule,
        thresholds: StandingThresholds,
    ) -> Self {
        let first_payment_date = schedule
            .get(0)
            .map(|p| p.due_date())
            .unwrap_or(start_date);

        let mut loan = Self {
            id,
            principal,
            annual_rate,
            interest: terms.interest,
            total_amount: terms.total_amount,
            weekly_installment: terms.weekly_installment,
            term_weeks: terms.term_weeks,
            start_date,
            first_payment_date,
            schedule,
            outstanding: terms.total_amount,
            standing: LoanStanding::GoodStanding,
            thresholds,
            events: EventStore::new(),
        };

        loan.events.emit(Event::LoanOriginated {
            loan_id: loan.id.clone(),
            principal,
            annual_rate,
            total_amount: loan.total_amount,
            weekly_installment: loan.weekly_installment,
            term_weeks: loan.term_weeks,
            start_date,
        });

        loan
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate(&self) -> Rate {
        self.annual_rate
    }

    /// flat interest charged at origination, before installment rounding
    pub fn interest(&self) -> Money {
        self.interest
    }

    /// principal plus flat interest, adjusted to a whole number of installments
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn weekly_installment(&self) -> Money {
        self.weekly_installment
    }

    pub fn term_weeks(&self) -> u32 {
        self.term_weeks
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn first_payment_date(&self) -> NaiveDate {
        self.first_payment_date
    }

    /// due date of the final installment
    pub fn maturity_date(&self) -> NaiveDate {
        self.schedule
            .last_due_date()
            .unwrap_or(self.first_payment_date)
    }

    pub fn schedule(&self) -> &PaymentSchedule {
        &self.schedule
    }

    pub fn outstanding(&self) -> Money {
        self.outstanding
    }

    /// standing as of the last `update_status` call
    pub fn standing(&self) -> LoanStanding {
        self.standing
    }

    pub fn is_delinquent(&self) -> bool {
        self.standing == LoanStanding::Delinquent
    }

    pub fn is_fully_paid(&self) -> bool {
        self.schedule.is_fully_paid()
    }

    pub fn total_paid(&self) -> Money {
        self.schedule.total_paid()
    }

    pub fn paid_weeks(&self) -> u32 {
        self.schedule.paid_count()
    }

    /// installment the next payment will settle
    pub fn next_payment_due(&self) -> Option<&PaymentDue> {
        self.schedule.earliest_unpaid()
    }

    /// schedule week a date falls in, -1 before the first week starts
    ///
    /// Week 0 spans `start + 1 ..= start + 7`, week 1 spans
    /// `start + 8 ..= start + 14`, and so on. Dates past the term stay in the
    /// final week.
    pub fn current_week(&self, date: NaiveDate) -> i64 {
        let days_since_start = (date - self.start_date).num_days();
        if days_since_start < 1 {
            return -1;
        }

        ((days_since_start - 1) / 7).min(self.term_weeks as i64 - 1)
    }

    /// past-due installments still unpaid as of `date`
    pub fn arrears(&self, date: NaiveDate) -> u32 {
        self.schedule.arrears_before(self.current_week(date))
    }

    /// derive the standing for `current_date` from scratch
    ///
    /// Earlier payments can move a loan back towards good standing; nothing
    /// here depends on the previous standing.
    pub fn update_status(&mut self, current_date: NaiveDate) -> LoanStanding {
        let current_week = self.current_week(current_date);
        let arrears = self.schedule.arrears_before(current_week);

        let new_standing = if current_week < 0 {
            LoanStanding::GoodStanding
        } else if current_week == self.term_weeks as i64 - 1 && arrears == 0 {
            LoanStanding::Closed
        } else {
            self.thresholds.classify(arrears)
        };

        if new_standing != self.standing {
            let old_standing = self.standing;
            self.standing = new_standing;

            if new_standing.severity() > old_standing.severity() {
                warn!(
                    "loan {} moved from {} to {} with {} week(s) in arrears on {}",
                    self.id, old_standing, new_standing, arrears, current_date
                );
            } else {
                info!(
                    "loan {} moved from {} to {} on {}",
                    self.id, old_standing, new_standing, current_date
                );
            }

            self.events.emit(Event::StandingChanged {
                loan_id: self.id.clone(),
                old_standing,
                new_standing,
                arrears,
                date: current_date,
            });
        } else {
            debug!(
                "loan {} stays {} in week {} ({} in arrears)",
                self.id, new_standing, current_week, arrears
            );
        }

        new_standing
    }

    /// settle the oldest unpaid installment
    ///
    /// The amount must equal that installment exactly and its week must have
    /// been reached by `payment_date`. A rejected payment changes nothing.
    /// Standing is not recomputed here.
    pub fn make_payment(&mut self, amount: Money, payment_date: NaiveDate) -> Result<&PaymentDue> {
        let current_week = self.current_week(payment_date);

        let due = self
            .schedule
            .earliest_unpaid_mut()
            .ok_or_else(|| LoanError::AlreadySettled {
                loan_id: self.id.clone(),
            })?;

        if due.week() as i64 > current_week {
            warn!(
                "loan {} rejected payment on {}: week {} is not due yet",
                self.id,
                payment_date,
                due.week()
            );
            return Err(LoanError::NotYetDue {
                week: due.week(),
                current_week,
            });
        }

        if amount != due.amount_due() {
            warn!(
                "loan {} rejected payment of {}: week {} requires {}",
                self.id,
                amount,
                due.week(),
                due.amount_due()
            );
            return Err(LoanError::WrongAmount {
                expected: due.amount_due(),
                provided: amount,
            });
        }

        due.mark_paid(payment_date);
        let week = due.week();

        self.outstanding = self.total_amount - self.schedule.total_paid();

        debug!(
            "loan {} settled week {} with {} on {}, outstanding {}",
            self.id, week, amount, payment_date, self.outstanding
        );

        self.events.emit(Event::PaymentReceived {
            loan_id: self.id.clone(),
            week,
            amount,
            outstanding: self.outstanding,
            date: payment_date,
        });

        if self.schedule.is_fully_paid() {
            info!("loan {} has settled its whole schedule", self.id);

            self.events.emit(Event::ScheduleCompleted {
                loan_id: self.id.clone(),
                total_paid: self.schedule.total_paid(),
                date: payment_date,
            });
        }

        Ok(&self.schedule.installments()[week as usize])
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}
