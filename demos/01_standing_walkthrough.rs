/// standing walkthrough - watch a loan slip into arrears and recover
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use weekly_loan_engine::{LoanEngine, LoanError, LoanStanding, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== standing walkthrough ===\n");

    let mut engine = LoanEngine::new(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
    let loan = engine.create_loan("L001", Money::from_major(5_000_000), Rate::from_decimal(dec!(0.1)), 50)?;
    let weekly = loan.weekly_installment();

    println!("total to repay: {}", loan.total_amount());
    println!("weekly installment: {}", weekly);
    println!("first payment due: {}\n", loan.first_payment_date());

    // paying on the start date is too early
    match engine.make_payment("L001", weekly) {
        Err(LoanError::NotYetDue { week, current_week }) => {
            println!("rejected: week {} not due, current week {}", week, current_week)
        }
        other => println!("unexpected: {:?}", other),
    }

    // miss two weeks
    engine.advance_days(15)?;
    println!("\n{}: standing {}", engine.current_date(), engine.standing("L001")?);
    assert_eq!(engine.standing("L001")?, LoanStanding::Delinquent);

    // wrong amounts are refused and change nothing
    if let Err(e) = engine.make_payment("L001", Money::from_major(100_000)) {
        println!("rejected: {}", e);
    }

    // each payment settles the oldest open week
    engine.make_payment("L001", weekly)?;
    println!("after one payment: standing {}", engine.standing("L001")?);
    engine.make_payment("L001", weekly)?;
    println!("after two payments: standing {}", engine.standing("L001")?);
    println!("outstanding: {}", engine.get_outstanding("L001")?);

    println!("\nevents:");
    for event in engine.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}
