pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod factory;
pub mod loan;
pub mod schedule;
pub mod serialization;
pub mod types;

// re-export key types
pub use config::{ProductConfig, StandingThresholds};
pub use decimal::{Money, Rate};
pub use engine::LoanEngine;
pub use errors::{LoanError, Result};
pub use events::{Event, EventStore};
pub use factory::{FlatRateWeeklyFactory, LoanFactory, OriginationTerms};
pub use loan::Loan;
pub use schedule::{PaymentDue, PaymentSchedule};
pub use serialization::LoanView;
pub use types::{InstallmentRounding, LoanId, LoanStanding};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
