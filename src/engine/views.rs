//! Settlement views: the engine applied to filtered or converted ledgers.
//!
//! Every view is an independent run of the net balance calculator and the
//! settlement reducer over its own snapshot of records.

use crate::config::{EngineConfig, TripConfig};
use crate::core::currency::{CurrencyCode, FxRates};
use crate::core::expense::ExpenseLedger;
use crate::core::roster::ParticipantRoster;
use crate::engine::balance::{NetBalanceCalculator, NetBalances};
use crate::engine::settlement::{SettlementMatrix, SettlementReducer};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Balances and settlement for one slice of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementView {
    /// Currency every amount in this view is denominated in.
    pub currency: CurrencyCode,
    /// Number of records that went into the view.
    pub record_count: usize,
    /// Records left out because their currency had no usable FX rate.
    pub dropped_count: usize,
    pub balances: NetBalances,
    pub matrix: SettlementMatrix,
}

impl SettlementView {
    /// True when no records contributed; callers show "No records".
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

/// Builds settlement views over a ledger and roster.
pub struct ViewBuilder<'a> {
    ledger: &'a ExpenseLedger,
    roster: &'a ParticipantRoster,
    reducer: SettlementReducer,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(ledger: &'a ExpenseLedger, roster: &'a ParticipantRoster) -> Self {
        Self {
            ledger,
            roster,
            reducer: SettlementReducer::new(),
        }
    }

    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.reducer = SettlementReducer::with_config(config);
        self
    }

    fn settle(
        &self,
        records: &ExpenseLedger,
        currency: CurrencyCode,
        dropped: usize,
    ) -> SettlementView {
        let balances = NetBalanceCalculator::compute_net(records.records(), self.roster);
        let matrix = self.reducer.reduce(&balances.net_map(), self.roster);
        debug!(
            "view {}: {} records, {} transfers",
            currency,
            records.len(),
            matrix.transfer_count()
        );
        SettlementView {
            currency,
            record_count: records.len(),
            dropped_count: dropped,
            balances,
            matrix,
        }
    }

    /// One view per distinct currency in the ledger, sorted by code.
    pub fn per_currency(&self) -> Vec<SettlementView> {
        self.ledger
            .currencies()
            .into_iter()
            .map(|c| self.for_currency(&c))
            .collect()
    }

    /// View over the records in a single currency.
    pub fn for_currency(&self, currency: &CurrencyCode) -> SettlementView {
        let filtered = self.ledger.filter_currency(currency);
        self.settle(&filtered, currency.clone(), 0)
    }

    /// View over the currency selected in `config`.
    pub fn selected(&self, config: &TripConfig) -> SettlementView {
        self.for_currency(&config.selected_currency)
    }

    /// View over every record converted into the FX base currency.
    ///
    /// Records whose currency has no usable rate are skipped, not failed.
    pub fn converted(&self, fx: &FxRates) -> SettlementView {
        let (converted, dropped) = convert_ledger(self.ledger, fx);
        if dropped > 0 {
            warn!(
                "converted view: {} records skipped (no rate for {:?}, or overflow)",
                dropped,
                fx.missing_rates(&self.ledger.currencies())
            );
        }
        self.settle(&converted, fx.base().clone(), dropped)
    }
}

/// Re-denominate every record into the FX base currency.
///
/// Returns the converted ledger and how many records had to be dropped
/// for lack of a usable rate or because the converted amount overflows.
pub fn convert_ledger(ledger: &ExpenseLedger, fx: &FxRates) -> (ExpenseLedger, usize) {
    let mut dropped = 0;
    let converted = ledger
        .records()
        .iter()
        .filter_map(|r| match fx.convert(r.amount(), r.currency()) {
            Some(amount) => Some(r.converted(amount, fx.base().clone())),
            None => {
                dropped += 1;
                None
            }
        })
        .collect();
    (converted, dropped)
}
