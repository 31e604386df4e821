//! # trip-settle
//!
//! Shared trip expense ledger with multi-currency balance reconciliation.
//!
//! Given a roster of participants and a ledger of shared expenses, this
//! crate computes what each participant paid and owes, and reduces the
//! resulting net positions to a matrix of debtor → creditor transfers.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: participants, roster, expenses, currencies
//! - **engine** — Net balance calculation, settlement reduction, views
//! - **config** — Caller-held settings (tolerance, selected currency, FX)
//! - **input** — JSON trip files
//! - **simulation** — Random trip generation

pub mod config;
pub mod core;
pub mod engine;
pub mod input;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::{EngineConfig, TripConfig};
    pub use crate::core::currency::{CurrencyCode, FxRates};
    pub use crate::core::expense::{ExpenseLedger, ExpenseRecord};
    pub use crate::core::participant::ParticipantName;
    pub use crate::core::roster::ParticipantRoster;
    pub use crate::engine::balance::{NetBalance, NetBalanceCalculator, NetBalances};
    pub use crate::engine::settlement::{SettlementMatrix, SettlementReducer, Transfer};
    pub use crate::engine::views::{SettlementView, ViewBuilder};
}
