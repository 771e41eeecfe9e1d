use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{LoanId, LoanStanding};

/// all events that can be emitted by a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        principal: Money,
        annual_rate: Rate,
        total_amount: Money,
        weekly_installment: Money,
        term_weeks: u32,
        start_date: NaiveDate,
    },
    ScheduleCompleted {
        loan_id: LoanId,
        total_paid: Money,
        date: NaiveDate,
    },

    // payment events
    PaymentReceived {
        loan_id: LoanId,
        week: u32,
        amount: Money,
        outstanding: Money,
        date: NaiveDate,
    },

    // status change events
    StandingChanged {
        loan_id: LoanId,
        old_standing: LoanStanding,
        new_standing: LoanStanding,
        arrears: u32,
        date: NaiveDate,
    },
}

impl Event {
    pub fn loan_id(&self) -> &str {
        match self {
            Event::LoanOriginated { loan_id, .. }
            | Event::ScheduleCompleted { loan_id, .. }
            | Event::PaymentReceived { loan_id, .. }
            | Event::StandingChanged { loan_id, .. } => loan_id,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
