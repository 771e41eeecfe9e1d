use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use log::{debug, info};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::Event;
use crate::factory::{FlatRateWeeklyFactory, LoanFactory};
use crate::loan::Loan;
use crate::types::{LoanId, LoanStanding};

/// registry of loans sharing one simulated clock
///
/// Every mutating call takes `&mut self`, so a payment and a day close can
/// never interleave on the same engine.
pub struct LoanEngine<F: LoanFactory = FlatRateWeeklyFactory> {
    loans: BTreeMap<LoanId, Loan>,
    time: SafeTimeProvider,
    factory: F,
}

impl LoanEngine<FlatRateWeeklyFactory> {
    /// engine with the default weekly product, clock set to `start_date`
    pub fn new(start_date: NaiveDate) -> Self {
        Self::with_factory(start_date, FlatRateWeeklyFactory::new())
    }
}

impl<F: LoanFactory> LoanEngine<F> {
    pub fn with_factory(start_date: NaiveDate, factory: F) -> Self {
        let midnight = start_date.and_time(chrono::NaiveTime::MIN).and_utc();
        Self::with_time_provider(SafeTimeProvider::new(TimeSource::Test(midnight)), factory)
    }

    /// share a clock with other components; it must be in test mode to advance
    pub fn with_time_provider(time: SafeTimeProvider, factory: F) -> Self {
        Self {
            loans: BTreeMap::new(),
            time,
            factory,
        }
    }

    pub fn current_date(&self) -> NaiveDate {
        self.time.now().date_naive()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// originate a loan starting today
    pub fn create_loan(
        &mut self,
        loan_id: &str,
        principal: Money,
        annual_rate: Rate,
        term_weeks: u32,
    ) -> Result<&Loan> {
        if self.loans.contains_key(loan_id) {
            return Err(LoanError::DuplicateId {
                loan_id: loan_id.to_string(),
            });
        }

        let loan = self.factory.create_loan(
            loan_id,
            principal,
            annual_rate,
            term_weeks,
            self.current_date(),
        )?;

        Ok(self.loans.entry(loan_id.to_string()).or_insert(loan))
    }

    /// apply a payment dated today, then refresh the loan's standing
    pub fn make_payment(&mut self, loan_id: &str, amount: Money) -> Result<()> {
        let today = self.current_date();
        let loan = self.loan_mut(loan_id)?;

        loan.make_payment(amount, today)?;
        loan.update_status(today);

        Ok(())
    }

    pub fn get_outstanding(&self, loan_id: &str) -> Result<Money> {
        Ok(self.loan(loan_id)?.outstanding())
    }

    pub fn is_delinquent(&self, loan_id: &str) -> Result<bool> {
        Ok(self.loan(loan_id)?.is_delinquent())
    }

    pub fn standing(&self, loan_id: &str) -> Result<LoanStanding> {
        Ok(self.loan(loan_id)?.standing())
    }

    pub fn loan(&self, loan_id: &str) -> Result<&Loan> {
        self.loans.get(loan_id).ok_or_else(|| LoanError::NotFound {
            loan_id: loan_id.to_string(),
        })
    }

    fn loan_mut(&mut self, loan_id: &str) -> Result<&mut Loan> {
        self.loans.get_mut(loan_id).ok_or_else(|| LoanError::NotFound {
            loan_id: loan_id.to_string(),
        })
    }

    /// ids in ascending order
    pub fn loan_ids(&self) -> impl Iterator<Item = &str> {
        self.loans.keys().map(|id| id.as_str())
    }

    pub fn loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    /// close the day: move the clock forward one day and re-derive every standing
    pub fn advance_one_day(&mut self) -> Result<NaiveDate> {
        let control = self.time.test_control().ok_or(LoanError::ClockNotSimulated)?;
        control.advance(Duration::days(1));

        let today = self.current_date();
        for loan in self.loans.values_mut() {
            loan.update_status(today);
        }

        let delinquent = self.loans.values().filter(|l| l.is_delinquent()).count();
        info!(
            "closed day, now {}: {} loan(s), {} delinquent",
            today,
            self.loans.len(),
            delinquent
        );

        Ok(today)
    }

    /// close `days` consecutive days
    pub fn advance_days(&mut self, days: u32) -> Result<NaiveDate> {
        debug!("advancing {} day(s) from {}", days, self.current_date());

        for _ in 0..days {
            self.advance_one_day()?;
        }

        Ok(self.current_date())
    }

    /// drain events from every loan, in loan id order
    pub fn take_events(&mut self) -> Vec<Event> {
        self.loans
            .values_mut()
            .flat_map(|loan| loan.take_events())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProductConfig;
    use crate::types::InstallmentRounding;
    use rust_decimal_macros::dec;
    use test_log::test;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
    }

    fn engine_with_loan() -> LoanEngine {
        let mut engine = LoanEngine::new(start());
        engine
            .create_loan("L001", Money::from_major(5_000_000), Rate::from_decimal(dec!(0.1)), 50)
            .unwrap();
        engine
    }

    fn weekly() -> Money {
        Money::from_major(110_840)
    }

    #[test]
    fn test_create_loan_starts_today() {
        let engine = engine_with_loan();
        let loan = engine.loan("L001").unwrap();

        assert_eq!(loan.start_date(), start());
        assert_eq!(loan.first_payment_date(), NaiveDate::from_ymd_opt(2023, 3, 8).unwrap());
        assert_eq!(loan.total_amount(), Money::from_major(5_542_000));
        assert_eq!(loan.weekly_installment(), weekly());
        assert_eq!(engine.get_outstanding("L001").unwrap(), Money::from_major(5_542_000));
        assert_eq!(engine.loan_ids().collect::<Vec<_>>(), vec!["L001"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut engine = engine_with_loan();

        let result = engine.create_loan("L001", Money::from_major(1), Rate::ZERO, 1);

        assert!(matches!(result, Err(LoanError::DuplicateId { ref loan_id }) if loan_id == "L001"));
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.loan("L001").unwrap().weekly_installment(), weekly());
    }

    #[test]
    fn test_invalid_loan_not_registered() {
        let mut engine = LoanEngine::new(start());

        let result = engine.create_loan("L002", Money::from_major(1_000), Rate::ZERO, 0);

        assert!(matches!(result, Err(LoanError::InvalidInput { .. })));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_unknown_loan_not_found() {
        let mut engine = LoanEngine::new(start());

        assert!(matches!(engine.get_outstanding("nope"), Err(LoanError::NotFound { .. })));
        assert!(matches!(engine.is_delinquent("nope"), Err(LoanError::NotFound { .. })));
        assert!(matches!(engine.standing("nope"), Err(LoanError::NotFound { .. })));
        assert!(matches!(engine.make_payment("nope", weekly()), Err(LoanError::NotFound { .. })));
    }

    #[test]
    fn test_advance_one_day_moves_clock() {
        let mut engine = LoanEngine::new(start());

        let today = engine.advance_one_day().unwrap();

        assert_eq!(today, NaiveDate::from_ymd_opt(2023, 3, 2).unwrap());
        assert_eq!(engine.current_date(), today);
        assert_eq!(engine.advance_days(6).unwrap(), NaiveDate::from_ymd_opt(2023, 3, 8).unwrap());
    }

    #[test]
    fn test_two_missed_weeks_make_loan_delinquent() {
        let mut engine = engine_with_loan();

        engine.advance_days(8).unwrap();
        assert_eq!(engine.standing("L001").unwrap(), LoanStanding::Late);
        assert!(!engine.is_delinquent("L001").unwrap());

        engine.advance_days(7).unwrap();
        assert!(engine.is_delinquent("L001").unwrap());

        engine.make_payment("L001", weekly()).unwrap();
        assert_eq!(engine.standing("L001").unwrap(), LoanStanding::Late);

        engine.advance_one_day().unwrap();
        assert_eq!(engine.standing("L001").unwrap(), LoanStanding::Late);
    }

    #[test]
    fn test_payments_reduce_outstanding() {
        let mut engine = engine_with_loan();

        engine.advance_days(7).unwrap();
        engine.make_payment("L001", weekly()).unwrap();
        assert_eq!(engine.get_outstanding("L001").unwrap(), Money::from_major(5_431_160));

        engine.advance_days(7).unwrap();
        engine.make_payment("L001", weekly()).unwrap();
        engine.advance_days(7).unwrap();
        engine.make_payment("L001", weekly()).unwrap();

        assert_eq!(engine.get_outstanding("L001").unwrap(), Money::from_major(5_209_480));
        assert!(!engine.is_delinquent("L001").unwrap());
    }

    #[test]
    fn test_payment_rejections() {
        let mut engine = engine_with_loan();

        // still on the start date
        assert!(matches!(engine.make_payment("L001", weekly()), Err(LoanError::NotYetDue { .. })));

        engine.advance_days(7).unwrap();
        assert!(matches!(
            engine.make_payment("L001", Money::from_major(100_000)),
            Err(LoanError::WrongAmount { .. })
        ));
        assert!(matches!(
            engine.make_payment("L001", Money::from_major(221_680)),
            Err(LoanError::WrongAmount { .. })
        ));

        engine.make_payment("L001", weekly()).unwrap();
        assert!(matches!(engine.make_payment("L001", weekly()), Err(LoanError::NotYetDue { .. })));
        assert_eq!(engine.get_outstanding("L001").unwrap(), Money::from_major(5_431_160));
    }

    #[test]
    fn test_catching_up_clears_delinquency() {
        let mut engine = engine_with_loan();

        // third week
        engine.advance_days(21).unwrap();
        assert!(engine.is_delinquent("L001").unwrap());

        engine.make_payment("L001", weekly()).unwrap();
        assert!(!engine.is_delinquent("L001").unwrap());
        engine.make_payment("L001", weekly()).unwrap();
        engine.make_payment("L001", weekly()).unwrap();
        assert_eq!(engine.standing("L001").unwrap(), LoanStanding::GoodStanding);

        // week 5, weeks 3 and 4 past due
        engine.advance_days(21).unwrap();
        assert!(engine.is_delinquent("L001").unwrap());

        engine.make_payment("L001", weekly()).unwrap();
        assert!(!engine.is_delinquent("L001").unwrap());
        engine.make_payment("L001", weekly()).unwrap();
        assert_eq!(engine.get_outstanding("L001").unwrap(), Money::from_major(4_987_800));
    }

    #[test]
    fn test_paid_off_loan_closes_and_rejects_more() {
        let mut engine = LoanEngine::new(start());
        engine.create_loan("L003", Money::from_major(1_000_000), Rate::ZERO, 2).unwrap();
        let installment = Money::from_major(500_000);

        engine.advance_days(7).unwrap();
        engine.make_payment("L003", installment).unwrap();
        engine.advance_days(7).unwrap();
        engine.make_payment("L003", installment).unwrap();

        assert_eq!(engine.standing("L003").unwrap(), LoanStanding::Closed);
        assert!(engine.get_outstanding("L003").unwrap().is_zero());
        assert!(matches!(
            engine.make_payment("L003", installment),
            Err(LoanError::AlreadySettled { .. })
        ));
    }

    #[test]
    fn test_day_close_updates_every_loan() {
        let mut engine = engine_with_loan();
        engine.create_loan("L002", Money::from_major(1_000_000), Rate::ZERO, 10).unwrap();

        engine.advance_days(15).unwrap();

        assert!(engine.loans().all(|loan| loan.is_delinquent()));

        let events = engine.take_events();
        let changes = events
            .iter()
            .filter(|e| matches!(e, Event::StandingChanged { .. }))
            .count();
        assert_eq!(changes, 4);
        assert_eq!(events.first().map(|e| e.loan_id()), Some("L001"));
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn test_custom_product_factory() {
        let mut config = ProductConfig::consumptive_weekly();
        config.installment_rounding = InstallmentRounding::HalfUp;
        let factory = FlatRateWeeklyFactory::with_config(config).unwrap();
        let mut engine = LoanEngine::with_factory(start(), factory);

        let loan = engine
            .create_loan("L072", Money::from_major(1_000_000), Rate::from_decimal(dec!(0.1)), 72)
            .unwrap();

        assert_eq!(loan.weekly_installment().as_decimal(), dec!(15972.22));
        assert_eq!(
            engine.factory().config().installment_rounding,
            InstallmentRounding::HalfUp
        );
    }

    #[test]
    fn test_system_clock_cannot_advance() {
        let time = SafeTimeProvider::new(TimeSource::System);
        let mut engine = LoanEngine::with_time_provider(time, FlatRateWeeklyFactory::new());

        assert!(matches!(engine.advance_one_day(), Err(LoanError::ClockNotSimulated)));
    }
}
