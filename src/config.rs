//! Caller-held configuration.
//!
//! Nothing in the engine remembers state between calls. The currency the
//! user is looking at, the FX rates they typed in, and the settlement
//! tolerance all live here and are passed in explicitly.

use crate::core::currency::{CurrencyCode, FxRates};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance below which a remaining balance counts as settled.
pub const DEFAULT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Currencies offered by the expense entry forms.
pub const DEFAULT_CURRENCIES: [&str; 3] = ["USD", "EUR", "TWD"];

/// Tuning for the settlement reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Remaining balances within this distance of zero are treated as zero.
    pub epsilon: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("currency {0} is not one of the configured currencies")]
    UnknownCurrency(CurrencyCode),
}

/// Per-trip view settings: which currencies exist, which one is
/// selected, and the manual FX table used for the converted view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripConfig {
    pub currencies: Vec<CurrencyCode>,
    pub selected_currency: CurrencyCode,
    pub fx: FxRates,
}

impl Default for TripConfig {
    fn default() -> Self {
        let currencies: Vec<CurrencyCode> = DEFAULT_CURRENCIES
            .iter()
            .map(|c| CurrencyCode::new(*c))
            .collect();
        let first = currencies[0].clone();
        Self {
            currencies,
            selected_currency: first.clone(),
            fx: FxRates::new(first),
        }
    }
}

impl TripConfig {
    /// Configuration with an FX table loaded from elsewhere.
    pub fn with_fx(fx: FxRates) -> Self {
        Self {
            fx,
            ..Self::default()
        }
    }

    /// Change the selected currency; it must be one of `currencies`.
    pub fn select_currency(&mut self, currency: CurrencyCode) -> Result<(), ConfigError> {
        if !self.currencies.contains(&currency) {
            return Err(ConfigError::UnknownCurrency(currency));
        }
        self.selected_currency = currency;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_epsilon() {
        assert_eq!(EngineConfig::default().epsilon, dec!(0.000000001));
    }

    #[test]
    fn test_default_trip_config() {
        let config = TripConfig::default();
        assert_eq!(config.currencies.len(), 3);
        assert_eq!(config.selected_currency.as_str(), "USD");
        assert_eq!(config.fx.base().as_str(), "USD");
    }

    #[test]
    fn test_select_currency() {
        let mut config = TripConfig::default();
        config.select_currency(CurrencyCode::new("TWD")).unwrap();
        assert_eq!(config.selected_currency.as_str(), "TWD");
        assert_eq!(
            config.select_currency(CurrencyCode::new("JPY")),
            Err(ConfigError::UnknownCurrency(CurrencyCode::new("JPY")))
        );
    }
}
