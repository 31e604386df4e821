use crate::core::currency::CurrencyCode;
use crate::core::participant::ParticipantName;
use crate::core::roster::ParticipantRoster;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Validation failures for a single expense record.
///
/// The settlement engine never raises these; they exist for callers that
/// want to reject bad input before it reaches the ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpenseError {
    #[error("expense amount must not be negative, got {0}")]
    NegativeAmount(Decimal),
    #[error("expense must list at least one participant")]
    NoParticipants,
    #[error("payer {0} is not on the roster")]
    UnknownPayer(ParticipantName),
    #[error("participant {0} is not on the roster")]
    UnknownParticipant(ParticipantName),
    #[error("no expense with id {0}")]
    NotFound(Uuid),
}

/// Split a comma-joined participant field into trimmed, non-empty names.
///
/// Order and duplicates are preserved exactly as written.
pub fn split_participants(field: &str) -> Vec<&str> {
    field
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Coerce free-form amount text into a decimal, falling back to zero.
///
/// Accepts plain decimals ("12.50") and scientific notation ("1.2e3").
///
/// ```
/// use trip_settle::core::expense::coerce_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(coerce_amount(" 12.50 "), dec!(12.50));
/// assert_eq!(coerce_amount("twelve"), dec!(0));
/// ```
pub fn coerce_amount(raw: &str) -> Decimal {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .unwrap_or(Decimal::ZERO)
}

/// A single shared expense.
///
/// `participants` is kept in its comma-joined form, the way it arrives
/// from the ledger store. The settlement engine derives the split from it
/// via [`ExpenseRecord::participant_tokens`], so a field full of blanks
/// simply yields nobody to charge.
///
/// # Examples
///
/// ```
/// use trip_settle::core::expense::ExpenseRecord;
/// use trip_settle::core::currency::CurrencyCode;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let dinner = ExpenseRecord::new(
///     NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
///     "Dinner",
///     dec!(90),
///     "Alice",
///     ["Alice", "Bob", "Carol"],
///     CurrencyCode::new("USD"),
/// );
///
/// assert_eq!(dinner.participants(), "Alice, Bob, Carol");
/// assert_eq!(dinner.share(), dec!(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    id: Uuid,
    date: NaiveDate,
    description: String,
    amount: Decimal,
    payer: ParticipantName,
    participants: String,
    currency: CurrencyCode,
}

impl ExpenseRecord {
    /// Create a record from a list of participant names.
    pub fn new<I, S>(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        payer: impl Into<String>,
        participants: I,
        currency: CurrencyCode,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = participants
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::from_raw(date, description, amount, payer, joined, currency)
    }

    /// Create a record from an already comma-joined participant field.
    pub fn from_raw(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        payer: impl Into<String>,
        participants: impl Into<String>,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            description: description.into(),
            amount,
            payer: ParticipantName::new(payer),
            participants: participants.into(),
            currency,
        }
    }

    /// Same record with a fixed id (for deterministic tests and reloads).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Same record re-denominated: new amount, new currency, same id.
    pub fn converted(&self, amount: Decimal, currency: CurrencyCode) -> Self {
        Self {
            amount,
            currency,
            ..self.clone()
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn payer(&self) -> &ParticipantName {
        &self.payer
    }

    /// The participant field as stored, comma-joined.
    pub fn participants(&self) -> &str {
        &self.participants
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Trimmed, non-empty participant names.
    pub fn participant_tokens(&self) -> Vec<&str> {
        split_participants(&self.participants)
    }

    /// Whether `name` appears among the participant tokens.
    pub fn includes(&self, name: &str) -> bool {
        self.participant_tokens().contains(&name)
    }

    /// Per-head share: the amount divided by the token count, or by one
    /// when the participant field is empty.
    pub fn share(&self) -> Decimal {
        let count = self.participant_tokens().len().max(1);
        self.amount / Decimal::from(count)
    }

    /// Strict check of this record against a roster.
    ///
    /// The settlement engine itself accepts anything; this is for callers
    /// that prefer rejecting unknown names over silently ignoring them.
    pub fn validate(&self, roster: &ParticipantRoster) -> Result<(), ExpenseError> {
        if self.amount < Decimal::ZERO {
            return Err(ExpenseError::NegativeAmount(self.amount));
        }
        let tokens = self.participant_tokens();
        if tokens.is_empty() {
            return Err(ExpenseError::NoParticipants);
        }
        if !roster.contains(self.payer.as_str()) {
            return Err(ExpenseError::UnknownPayer(self.payer.clone()));
        }
        if let Some(unknown) = tokens.iter().find(|t| !roster.contains(t)) {
            return Err(ExpenseError::UnknownParticipant(ParticipantName::new(*unknown)));
        }
        Ok(())
    }
}

/// All expenses of a trip, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseLedger {
    records: Vec<ExpenseRecord>,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn add(&mut self, record: ExpenseRecord) {
        self.records.push(record);
    }

    /// Replace the record with the same id, keeping its position.
    pub fn update(&mut self, record: ExpenseRecord) -> Result<(), ExpenseError> {
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or(ExpenseError::NotFound(record.id()))?;
        *slot = record;
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&ExpenseRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records denominated in `currency`, as a new ledger.
    pub fn filter_currency(&self, currency: &CurrencyCode) -> ExpenseLedger {
        self.records
            .iter()
            .filter(|r| r.currency() == currency)
            .cloned()
            .collect()
    }

    /// Distinct currencies present in the ledger, sorted.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut currencies: Vec<CurrencyCode> =
            self.records.iter().map(|r| r.currency().clone()).collect();
        currencies.sort();
        currencies.dedup();
        currencies
    }

    /// Sum of all amounts, regardless of currency. Saturates at
    /// `Decimal::MAX`.
    pub fn gross_total(&self) -> Decimal {
        self.records
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.amount()))
    }
}

impl FromIterator<ExpenseRecord> for ExpenseLedger {
    fn from_iter<T: IntoIterator<Item = ExpenseRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
