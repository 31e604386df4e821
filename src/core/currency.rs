use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// ISO 4217-style currency tag attached to an expense.
///
/// The engine is not tied to any fixed list: it works over whatever
/// tags appear in the ledger.
///
/// # Examples
///
/// ```
/// use trip_settle::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let twd = CurrencyCode::new("TWD");
/// assert_ne!(usd, twd);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors arising from manual FX rate entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FxError {
    #[error("FX rate must not be negative, got {rate} for {currency}")]
    NegativeRate { currency: CurrencyCode, rate: Decimal },
    #[error("the rate of base currency {0} is fixed at 1")]
    BaseRateFixed(CurrencyCode),
}

/// Manually entered FX rates towards a single base currency.
///
/// Each entry reads "1 unit of `currency` = `rate` units of base". The base
/// currency always converts at exactly 1. A rate of zero is kept as
/// entered but treated the same as an absent rate: records in that
/// currency cannot be converted.
///
/// # Examples
///
/// ```
/// use trip_settle::core::currency::{CurrencyCode, FxRates};
/// use rust_decimal_macros::dec;
///
/// let mut rates = FxRates::new(CurrencyCode::new("USD"));
/// rates.set_rate(CurrencyCode::new("TWD"), dec!(0.031)).unwrap();
///
/// let usd = rates.convert(dec!(1000), &CurrencyCode::new("TWD"));
/// assert_eq!(usd, Some(dec!(31)));
/// assert_eq!(rates.convert(dec!(5), &CurrencyCode::new("EUR")), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FxRates {
    base: CurrencyCode,
    #[serde(default)]
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl FxRates {
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            base,
            rates: BTreeMap::new(),
        }
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Set "1 `currency` = `rate` base". Zero is accepted and means "unset".
    pub fn set_rate(&mut self, currency: CurrencyCode, rate: Decimal) -> Result<(), FxError> {
        if currency == self.base {
            return Err(FxError::BaseRateFixed(currency));
        }
        if rate < Decimal::ZERO {
            return Err(FxError::NegativeRate { currency, rate });
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    /// Switch to a new base currency.
    ///
    /// Rates entered for other currencies are kept as they are; the new
    /// base's own entry is discarded since it is pinned to 1.
    pub fn rebase(&mut self, base: CurrencyCode) {
        self.rates.remove(&base);
        self.base = base;
    }

    /// Usable rate for a currency, or `None` when it is absent or zero.
    pub fn rate(&self, currency: &CurrencyCode) -> Option<Decimal> {
        if *currency == self.base {
            return Some(Decimal::ONE);
        }
        self.rates
            .get(currency)
            .copied()
            .filter(|r| *r != Decimal::ZERO)
    }

    /// Rates entered for currencies other than the base, including zeros.
    pub fn rates(&self) -> impl Iterator<Item = (&CurrencyCode, &Decimal)> {
        self.rates.iter()
    }

    /// Convert an amount into the base currency.
    ///
    /// `None` when the rate is missing or the product does not fit in a
    /// `Decimal`; either way the amount cannot be expressed in the base.
    pub fn convert(&self, amount: Decimal, currency: &CurrencyCode) -> Option<Decimal> {
        self.rate(currency).and_then(|r| amount.checked_mul(r))
    }

    /// Currencies from `currencies` that have no usable rate, deduplicated
    /// and sorted.
    pub fn missing_rates<'a, I>(&self, currencies: I) -> Vec<CurrencyCode>
    where
        I: IntoIterator<Item = &'a CurrencyCode>,
    {
        let mut missing: Vec<CurrencyCode> = currencies
            .into_iter()
            .filter(|c| self.rate(c).is_none())
            .cloned()
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}
