use crate::config::EngineConfig;
use crate::core::participant::ParticipantName;
use crate::core::roster::ParticipantRoster;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: ParticipantName,
    pub to: ParticipantName,
    pub amount: Decimal,
}

/// Square matrix of transfers, indexed by roster order on both axes.
///
/// Cell `[debtor][creditor]` holds what the debtor pays the creditor.
/// The diagonal and every unused cell are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementMatrix {
    names: Vec<ParticipantName>,
    cells: Vec<Vec<Decimal>>,
}

impl SettlementMatrix {
    /// All-zero matrix over the roster.
    pub fn zeros(roster: &ParticipantRoster) -> Self {
        let n = roster.len();
        Self {
            names: roster.names().to_vec(),
            cells: vec![vec![Decimal::ZERO; n]; n],
        }
    }

    pub fn names(&self) -> &[ParticipantName] {
        &self.names
    }

    pub fn size(&self) -> usize {
        self.names.len()
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_str() == name)
    }

    /// Amount `debtor` pays `creditor`; zero for unknown names.
    pub fn amount(&self, debtor: &str, creditor: &str) -> Decimal {
        match (self.index(debtor), self.index(creditor)) {
            (Some(d), Some(c)) => self.cells[d][c],
            _ => Decimal::ZERO,
        }
    }

    /// Matrix rows in roster order.
    pub fn rows(&self) -> &[Vec<Decimal>] {
        &self.cells
    }

    /// Total `name` pays out (row sum).
    pub fn outgoing(&self, name: &str) -> Decimal {
        self.index(name)
            .map(|i| self.cells[i].iter().copied().sum())
            .unwrap_or(Decimal::ZERO)
    }

    /// Total `name` receives (column sum).
    pub fn incoming(&self, name: &str) -> Decimal {
        self.index(name)
            .map(|j| self.cells.iter().map(|row| row[j]).sum())
            .unwrap_or(Decimal::ZERO)
    }

    /// Non-zero cells as transfers, row-major in roster order.
    pub fn transfers(&self) -> Vec<Transfer> {
        let mut transfers = Vec::new();
        for (d, row) in self.cells.iter().enumerate() {
            for (c, amount) in row.iter().enumerate() {
                if *amount != Decimal::ZERO {
                    transfers.push(Transfer {
                        from: self.names[d].clone(),
                        to: self.names[c].clone(),
                        amount: *amount,
                    });
                }
            }
        }
        transfers
    }

    pub fn transfer_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|a| **a != Decimal::ZERO)
            .count()
    }

    /// Sum of every transfer, saturating at `Decimal::MAX`.
    pub fn total(&self) -> Decimal {
        self.cells
            .iter()
            .flatten()
            .fold(Decimal::ZERO, |acc, a| acc.saturating_add(*a))
    }

    pub fn is_zero(&self) -> bool {
        self.transfer_count() == 0
    }
}

impl std::fmt::Display for SettlementMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .names
            .iter()
            .map(|n| n.as_str().chars().count())
            .max()
            .unwrap_or(0)
            .max(10);

        write!(f, "{:<width$}", "pays \\ to", width = width)?;
        for name in &self.names {
            write!(f, " {:>width$}", name.as_str(), width = width)?;
        }
        writeln!(f)?;
        for (name, row) in self.names.iter().zip(&self.cells) {
            write!(f, "{:<width$}", name.as_str(), width = width)?;
            for amount in row {
                write!(f, " {:>width$}", amount.round_dp(2).to_string(), width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Turns net balances into debtor → creditor transfers.
///
/// Uses a greedy two-pointer drain over creditors and debtors, both taken
/// in roster order. The result is not always the smallest possible set of
/// transfers, but it is stable for a given roster order and never needs
/// more than `creditors + debtors - 1` of them.
#[derive(Debug, Clone, Default)]
pub struct SettlementReducer {
    config: EngineConfig,
}

impl SettlementReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Reduce with the default tolerance.
    pub fn reduce_to_settlement(
        net: &HashMap<ParticipantName, Decimal>,
        roster: &ParticipantRoster,
    ) -> SettlementMatrix {
        Self::new().reduce(net, roster)
    }

    /// Build the settlement matrix for `net` over `roster`.
    ///
    /// # Algorithm
    ///
    /// 1. Split the roster into creditors (net > 0) and debtors (net < 0),
    ///    keeping roster order. Names missing from `net` count as zero.
    /// 2. Walk both lists with one cursor each.
    /// 3. give = min(creditor remaining, debtor remaining owed).
    /// 4. Record `give` when it exceeds epsilon and move it across.
    /// 5. Advance whichever side is within epsilon of zero (possibly both).
    /// 6. Stop once either list runs out; leftover dust stays unassigned.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_settle::prelude::*;
    /// use rust_decimal_macros::dec;
    /// use std::collections::HashMap;
    ///
    /// let roster = ParticipantRoster::from_names(["A", "B", "C"]).unwrap();
    /// let net = HashMap::from([
    ///     (ParticipantName::new("A"), dec!(50)),
    ///     (ParticipantName::new("B"), dec!(-20)),
    ///     (ParticipantName::new("C"), dec!(-30)),
    /// ]);
    ///
    /// let matrix = SettlementReducer::reduce_to_settlement(&net, &roster);
    /// assert_eq!(matrix.amount("B", "A"), dec!(20));
    /// assert_eq!(matrix.amount("C", "A"), dec!(30));
    /// ```
    pub fn reduce(
        &self,
        net: &HashMap<ParticipantName, Decimal>,
        roster: &ParticipantRoster,
    ) -> SettlementMatrix {
        let epsilon = self.config.epsilon;
        let mut matrix = SettlementMatrix::zeros(roster);

        let position = |name: &ParticipantName| net.get(name).copied().unwrap_or(Decimal::ZERO);

        // (roster index, remaining balance)
        let mut creditors: Vec<(usize, Decimal)> = Vec::new();
        let mut debtors: Vec<(usize, Decimal)> = Vec::new();
        for (i, name) in roster.iter().enumerate() {
            let value = position(name);
            if value > Decimal::ZERO {
                creditors.push((i, value));
            } else if value < Decimal::ZERO {
                debtors.push((i, value));
            }
        }

        let (mut ci, mut di) = (0, 0);
        while ci < creditors.len() && di < debtors.len() {
            let (c, credit) = creditors[ci];
            let (d, debt) = debtors[di];

            let give = credit.min(-debt);
            if give > epsilon {
                matrix.cells[d][c] += give;
                creditors[ci].1 -= give;
                debtors[di].1 += give;
                debug!(
                    "settlement: {} pays {} {}",
                    matrix.names[d], matrix.names[c], give
                );
            }

            if creditors[ci].1 <= epsilon {
                ci += 1;
            }
            if debtors[di].1 >= -epsilon {
                di += 1;
            }
        }

        matrix
    }
}
