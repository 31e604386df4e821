//! Random trip generation.
//!
//! Produces a roster and an expense ledger for exercising the engine
//! under various sizes and currency mixes.

use crate::core::currency::CurrencyCode;
use crate::core::expense::{ExpenseLedger, ExpenseRecord};
use crate::core::roster::ParticipantRoster;
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Configuration for generating a random trip.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of participants on the roster.
    pub participant_count: usize,
    /// Number of expenses to generate.
    pub expense_count: usize,
    /// Currencies to draw from.
    pub currencies: Vec<CurrencyCode>,
    /// Smallest expense amount.
    pub min_amount: Decimal,
    /// Largest expense amount.
    pub max_amount: Decimal,
    /// Date of the first expense.
    pub start_date: NaiveDate,
    /// Length of the trip in days.
    pub days: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            participant_count: 5,
            expense_count: 20,
            currencies: vec![CurrencyCode::new("USD")],
            min_amount: Decimal::from(5),
            max_amount: Decimal::from(500),
            start_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap_or_default(),
            days: 14,
        }
    }
}

/// A generated roster together with its expenses.
#[derive(Debug, Clone)]
pub struct GeneratedTrip {
    pub roster: ParticipantRoster,
    pub ledger: ExpenseLedger,
}

const DESCRIPTIONS: [&str; 8] = [
    "Dinner", "Fuel", "Hotel", "Groceries", "Museum", "Taxi", "Coffee", "Ferry",
];

/// Generate a random trip.
///
/// Every payer and participant is drawn from the generated roster, so the
/// net balances of a generated trip always sum to zero.
pub fn generate_trip(config: &GeneratorConfig) -> GeneratedTrip {
    let mut rng = rand::thread_rng();

    let roster = ParticipantRoster::from_names(
        (0..config.participant_count).map(|i| format!("P{:03}", i)),
    )
    .unwrap_or_default();
    let names = roster.names();

    let mut ledger = ExpenseLedger::new();
    if names.is_empty() || config.currencies.is_empty() {
        return GeneratedTrip { roster, ledger };
    }

    let min_cents = (config.min_amount * Decimal::ONE_HUNDRED)
        .to_i128()
        .unwrap_or(0)
        .max(0);
    let max_cents = (config.max_amount * Decimal::ONE_HUNDRED)
        .to_i128()
        .unwrap_or(0)
        .max(min_cents + 1);

    for _ in 0..config.expense_count {
        let payer = &names[rng.gen_range(0..names.len())];
        let split_size = rng.gen_range(1..=names.len());
        let mut participants: Vec<&str> = names
            .choose_multiple(&mut rng, split_size)
            .map(|n| n.as_str())
            .collect();
        participants.sort_unstable();

        let amount = Decimal::from_i128_with_scale(rng.gen_range(min_cents..max_cents), 2);
        let offset = rng.gen_range(0..config.days.max(1));
        let date = config.start_date + Duration::days(i64::from(offset));
        let description = DESCRIPTIONS[rng.gen_range(0..DESCRIPTIONS.len())];
        let currency = config.currencies[rng.gen_range(0..config.currencies.len())].clone();

        ledger.add(ExpenseRecord::new(
            date,
            description,
            amount,
            payer.as_str(),
            participants,
            currency,
        ));
    }

    GeneratedTrip { roster, ledger }
}
