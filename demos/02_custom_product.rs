/// custom product - load a product definition from json
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use weekly_loan_engine::{FlatRateWeeklyFactory, LoanEngine, Money, ProductConfig, Rate};

const PRODUCT: &str = r#"{
    "name": "lenient_weekly",
    "weeks_per_month": 4,
    "months_per_year": 12,
    "rate_scale": 4,
    "currency_scale": 2,
    "installment_rounding": "HalfUp",
    "standing": { "late": 2, "delinquent": 4 }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== custom product ===\n");

    let config = ProductConfig::from_json(PRODUCT)?;
    let factory = FlatRateWeeklyFactory::with_config(config)?;

    // quote before originating
    let terms = factory.quote(Money::from_major(1_000_000), Rate::from_decimal(dec!(0.1)), 72)?;
    println!("months billed: {}", terms.months);
    println!("period rate: {}", terms.period_rate);
    println!("interest: {}", terms.interest);
    println!("weekly: {}", terms.weekly_installment);
    println!("total: {}\n", terms.total_amount);

    let mut engine = LoanEngine::with_factory(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), factory);
    engine.create_loan("L072", Money::from_major(1_000_000), Rate::from_decimal(dec!(0.1)), 72)?;

    // three missed weeks are only late under this product
    for _ in 0..4 {
        engine.advance_days(7)?;
        println!("{}: {}", engine.current_date(), engine.standing("L072")?);
    }

    Ok(())
}
