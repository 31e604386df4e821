//! JSON trip files.
//!
//! A trip file carries the roster, the raw expense rows and, optionally,
//! the manual FX settings:
//!
//! ```json
//! {
//!   "participants": ["Alice", "Bob", "Carol"],
//!   "expenses": [
//!     { "date": "2024-07-01", "description": "Fuel", "amount": "90",
//!       "payer": "Alice", "participants": "Alice, Bob, Carol", "currency": "USD" }
//!   ],
//!   "fx": { "base": "USD", "rates": { "TWD": "0.031" } }
//! }
//! ```
//!
//! Amounts may be numbers or strings; anything unparseable becomes zero,
//! and a negative amount rejects the whole file. Participants may be a
//! comma-joined string or a list. Names outside the roster are accepted
//! here and reported by [`ExpenseRecord::validate`].

use crate::config::TripConfig;
use crate::core::currency::{CurrencyCode, FxError, FxRates};
use crate::core::expense::{coerce_amount, ExpenseLedger, ExpenseRecord};
use crate::core::roster::{ParticipantRoster, RosterError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TripFileError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trip JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid roster: {0}")]
    Roster(#[from] RosterError),
    #[error("invalid FX settings: {0}")]
    Fx(#[from] FxError),
    #[error("expense {index}: date {value:?} is not YYYY-MM-DD")]
    InvalidDate { index: usize, value: String },
    #[error("expense {index}: amount {amount} is negative")]
    NegativeAmount { index: usize, amount: Decimal },
}

/// Participant field as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParticipantsField {
    Joined(String),
    List(Vec<String>),
}

impl ParticipantsField {
    fn joined(&self) -> String {
        match self {
            ParticipantsField::Joined(s) => s.clone(),
            ParticipantsField::List(names) => names.join(", "),
        }
    }
}

/// One expense row as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: serde_json::Value,
    pub payer: String,
    pub participants: ParticipantsField,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// FX block as written in the file; rates may be numbers or strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRow {
    pub base: String,
    #[serde(default)]
    pub rates: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripFile {
    pub participants: Vec<String>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx: Option<FxRow>,
}

/// A loaded trip: roster, ledger, and view settings.
#[derive(Debug, Clone)]
pub struct Trip {
    pub roster: ParticipantRoster,
    pub ledger: ExpenseLedger,
    pub config: TripConfig,
}

fn coerce_value(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::Number(n) => coerce_amount(&n.to_string()),
        serde_json::Value::String(s) => coerce_amount(s),
        _ => Decimal::ZERO,
    }
}

impl TripFile {
    pub fn from_json(json: &str) -> Result<Self, TripFileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TripFileError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TripFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Validate the roster and FX block and build the in-memory trip.
    ///
    /// Expenses are taken as they are: names outside the roster are kept
    /// and simply ignored by the engine later. Negative amounts are
    /// rejected.
    pub fn into_trip(self) -> Result<Trip, TripFileError> {
        let roster = ParticipantRoster::from_names(&self.participants)?;

        let mut ledger = ExpenseLedger::new();
        for (index, row) in self.expenses.into_iter().enumerate() {
            let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d").map_err(|_| {
                TripFileError::InvalidDate {
                    index,
                    value: row.date.clone(),
                }
            })?;
            let amount = coerce_value(&row.amount);
            if amount < Decimal::ZERO {
                return Err(TripFileError::NegativeAmount { index, amount });
            }
            let mut record = ExpenseRecord::from_raw(
                date,
                row.description,
                amount,
                row.payer.trim(),
                row.participants.joined(),
                CurrencyCode::new(row.currency.trim()),
            );
            if let Some(id) = row.id {
                record = record.with_id(id);
            }
            ledger.add(record);
        }

        let mut config = match self.fx {
            Some(fx_row) => {
                let mut fx = FxRates::new(CurrencyCode::new(fx_row.base.trim()));
                for (currency, rate) in &fx_row.rates {
                    let currency = CurrencyCode::new(currency.trim());
                    if currency == *fx.base() {
                        continue;
                    }
                    fx.set_rate(currency, coerce_value(rate))?;
                }
                TripConfig::with_fx(fx)
            }
            None => TripConfig::default(),
        };

        for currency in ledger.currencies() {
            if !config.currencies.contains(&currency) {
                config.currencies.push(currency);
            }
        }

        Ok(Trip {
            roster,
            ledger,
            config,
        })
    }

    /// Serialize a trip back into file form.
    pub fn from_trip(trip: &Trip) -> Self {
        let expenses = trip
            .ledger
            .records()
            .iter()
            .map(|r| ExpenseRow {
                id: Some(r.id()),
                date: r.date().format("%Y-%m-%d").to_string(),
                description: r.description().to_string(),
                amount: serde_json::Value::String(r.amount().to_string()),
                payer: r.payer().to_string(),
                participants: ParticipantsField::Joined(r.participants().to_string()),
                currency: r.currency().to_string(),
            })
            .collect();

        let fx = &trip.config.fx;
        let fx = FxRow {
            base: fx.base().to_string(),
            rates: fx
                .rates()
                .map(|(c, r)| (c.to_string(), serde_json::Value::String(r.to_string())))
                .collect(),
        };

        Self {
            participants: trip.roster.iter().map(|n| n.to_string()).collect(),
            expenses,
            fx: Some(fx),
        }
    }
}
