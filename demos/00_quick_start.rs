/// quick start - minimal example to get started
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use weekly_loan_engine::{LoanEngine, LoanView, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut engine = LoanEngine::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());

    // 1,000,000 at 10% a year over 20 weeks
    engine.create_loan("L001", Money::from_major(1_000_000), Rate::from_decimal(dec!(0.1)), 20)?;

    // first installment falls due after a week
    engine.advance_days(7)?;
    engine.make_payment("L001", Money::from_major(52_085))?;

    // print current state
    println!("{}", LoanView::from_loan(engine.loan("L001")?).to_json_pretty()?);

    Ok(())
}
