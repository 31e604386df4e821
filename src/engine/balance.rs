use crate::core::expense::ExpenseRecord;
use crate::core::participant::ParticipantName;
use crate::core::roster::ParticipantRoster;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What one participant paid and owes within a set of expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalance {
    /// Sum of amounts this participant paid for.
    pub paid: Decimal,
    /// Sum of this participant's shares.
    pub owed: Decimal,
}

impl NetBalance {
    /// Paid minus owed. Positive means the group owes this participant.
    pub fn net(&self) -> Decimal {
        self.paid - self.owed
    }
}

/// Net balances of every roster member, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalances {
    entries: Vec<(ParticipantName, NetBalance)>,
}

impl NetBalances {
    pub fn get(&self, name: &str) -> Option<&NetBalance> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, b)| b)
    }

    /// Net position of `name`, zero when not on the roster.
    pub fn net(&self, name: &str) -> Decimal {
        self.get(name).map(NetBalance::net).unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantName, &NetBalance)> {
        self.entries.iter().map(|(n, b)| (n, b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name → net map, the input shape of the settlement reducer.
    pub fn net_map(&self) -> HashMap<ParticipantName, Decimal> {
        self.entries
            .iter()
            .map(|(n, b)| (n.clone(), b.net()))
            .collect()
    }

    /// Sum of all nets. Close to zero whenever every payer and
    /// participant is on the roster. Saturates instead of overflowing.
    pub fn total_net(&self) -> Decimal {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |acc, (_, b)| acc.saturating_add(b.net()))
    }
}

/// Computes paid/owed/net per participant from a set of expenses.
///
/// The calculator is permissive: payers and participants that are not on
/// the roster are ignored, and records in different currencies are summed
/// together. Filter or convert the records first when that matters.
pub struct NetBalanceCalculator;

impl NetBalanceCalculator {
    /// Compute net balances for every roster member.
    ///
    /// # Algorithm
    ///
    /// 1. paid(name) = Σ amount over records paid by `name`.
    /// 2. Each record's share = amount / max(1, participant token count).
    /// 3. owed(name) = Σ share over records listing `name`.
    /// 4. net = paid − owed.
    ///
    /// A record whose amount would push any total past `Decimal::MAX` is
    /// skipped as a whole, so the remaining totals still balance.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_settle::prelude::*;
    /// use chrono::NaiveDate;
    /// use rust_decimal_macros::dec;
    ///
    /// let roster = ParticipantRoster::from_names(["Alice", "Bob", "Carol"]).unwrap();
    /// let records = vec![ExpenseRecord::from_raw(
    ///     NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
    ///     "Fuel",
    ///     dec!(90),
    ///     "Alice",
    ///     "Alice,Bob,Carol",
    ///     CurrencyCode::new("USD"),
    /// )];
    ///
    /// let balances = NetBalanceCalculator::compute_net(&records, &roster);
    /// assert_eq!(balances.net("Alice"), dec!(60));
    /// assert_eq!(balances.net("Bob"), dec!(-30));
    /// ```
    pub fn compute_net(records: &[ExpenseRecord], roster: &ParticipantRoster) -> NetBalances {
        let mut by_name: HashMap<&str, NetBalance> = roster
            .iter()
            .map(|n| (n.as_str(), NetBalance::default()))
            .collect();

        for record in records {
            if !Self::apply(&mut by_name, record) {
                warn!(
                    "skipping expense {}: amount {} overflows the running totals",
                    record.id(),
                    record.amount()
                );
            }
        }

        let entries = roster
            .iter()
            .map(|n| (n.clone(), by_name[n.as_str()]))
            .collect();
        NetBalances { entries }
    }

    /// Add one record to the running totals. Nothing is written unless
    /// every addition fits.
    fn apply(by_name: &mut HashMap<&str, NetBalance>, record: &ExpenseRecord) -> bool {
        let mut updates: Vec<(&str, NetBalance)> = Vec::new();

        if let Some((name, balance)) = by_name.get_key_value(record.payer().as_str()) {
            match balance.paid.checked_add(record.amount()) {
                Some(paid) => updates.push((*name, NetBalance { paid, ..*balance })),
                None => return false,
            }
        }

        let mut tokens = record.participant_tokens();
        let share = record.amount() / Decimal::from(tokens.len().max(1));
        // A name listed twice still owes a single share.
        tokens.sort_unstable();
        tokens.dedup();
        for token in tokens {
            let Some((name, balance)) = by_name.get_key_value(token) else {
                continue;
            };
            let current = updates
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, b)| *b)
                .unwrap_or(*balance);
            let Some(owed) = current.owed.checked_add(share) else {
                return false;
            };
            let updated = NetBalance { owed, ..current };
            match updates.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = updated,
                None => updates.push((*name, updated)),
            }
        }

        for (name, balance) in updates {
            by_name.insert(name, balance);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(amount: Decimal, payer: &str, parts: &str) -> ExpenseRecord {
        ExpenseRecord::from_raw(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            "test",
            amount,
            payer,
            parts,
            CurrencyCode::new("USD"),
        )
    }

    fn roster(names: &[&str]) -> ParticipantRoster {
        ParticipantRoster::from_names(names).unwrap()
    }

    #[test]
    fn test_three_way_split() {
        let balances = NetBalanceCalculator::compute_net(
            &[record(dec!(90), "Alice", "Alice,Bob,Carol")],
            &roster(&["Alice", "Bob", "Carol"]),
        );

        let alice = balances.get("Alice").unwrap();
        assert_eq!(alice.paid, dec!(90));
        assert_eq!(alice.owed, dec!(30));
        assert_eq!(alice.net(), dec!(60));
        assert_eq!(balances.net("Bob"), dec!(-30));
        assert_eq!(balances.net("Carol"), dec!(-30));
        assert_eq!(balances.total_net(), Decimal::ZERO);
    }

    #[test]
    fn test_blank_tokens_do_not_count() {
        let balances = NetBalanceCalculator::compute_net(
            &[record(dec!(50), "Alice", "Alice,  ,Bob")],
            &roster(&["Alice", "Bob"]),
        );
        assert_eq!(balances.get("Alice").unwrap().owed, dec!(25));
        assert_eq!(balances.get("Bob").unwrap().owed, dec!(25));
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let balances = NetBalanceCalculator::compute_net(
            &[
                record(dec!(30), "Zoe", "Alice, Zoe, Bob"),
                record(dec!(12), "Alice", "Alice, Bob"),
            ],
            &roster(&["Alice", "Bob"]),
        );
        // Zoe's payment and her share vanish; the roster no longer sums to zero.
        assert_eq!(balances.len(), 2);
        assert_eq!(balances.get("Alice").unwrap().paid, dec!(12));
        assert_eq!(balances.get("Alice").unwrap().owed, dec!(16));
        assert_eq!(balances.get("Bob").unwrap().owed, dec!(16));
        assert_eq!(balances.total_net(), dec!(-20));
        assert!(balances.get("Zoe").is_none());
        assert_eq!(balances.net("Zoe"), Decimal::ZERO);
    }

    #[test]
    fn test_empty_participant_field_charges_nobody() {
        let balances = NetBalanceCalculator::compute_net(
            &[record(dec!(40), "Alice", " , ")],
            &roster(&["Alice", "Bob"]),
        );
        assert_eq!(balances.get("Alice").unwrap().owed, Decimal::ZERO);
        assert_eq!(balances.net("Alice"), dec!(40));
        assert_eq!(balances.net("Bob"), Decimal::ZERO);
    }

    #[test]
    fn test_empty_roster() {
        let balances =
            NetBalanceCalculator::compute_net(&[record(dec!(10), "Alice", "Alice")], &roster(&[]));
        assert!(balances.is_empty());
        assert!(balances.net_map().is_empty());
    }

    #[test]
    fn test_no_records_all_zero() {
        let balances = NetBalanceCalculator::compute_net(&[], &roster(&["Alice", "Bob"]));
        assert_eq!(balances.len(), 2);
        assert!(balances.iter().all(|(_, b)| *b == NetBalance::default()));
    }

    #[test]
    fn test_payer_outside_split() {
        let balances = NetBalanceCalculator::compute_net(
            &[record(dec!(20), "Carol", "Alice, Bob")],
            &roster(&["Alice", "Bob", "Carol"]),
        );
        assert_eq!(balances.net("Carol"), dec!(20));
        assert_eq!(balances.net("Alice"), dec!(-10));
        assert_eq!(balances.net("Bob"), dec!(-10));
    }

    #[test]
    fn test_preserves_roster_order() {
        let balances = NetBalanceCalculator::compute_net(&[], &roster(&["Carol", "Alice"]));
        let names: Vec<&str> = balances.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Carol", "Alice"]);
    }

    #[test]
    fn test_repeated_name_charged_once() {
        let balances = NetBalanceCalculator::compute_net(
            &[record(dec!(90), "Alice", "Alice, Alice, Bob")],
            &roster(&["Alice", "Bob"]),
        );
        // Three tokens set the share; the third share is charged to nobody.
        assert_eq!(balances.get("Alice").unwrap().owed, dec!(30));
        assert_eq!(balances.get("Bob").unwrap().owed, dec!(30));
        assert_eq!(balances.net("Alice"), dec!(60));
        assert_eq!(balances.net("Bob"), dec!(-30));
        assert_eq!(balances.total_net(), dec!(30));
    }

    #[test]
    fn test_overflowing_record_is_skipped() {
        let balances = NetBalanceCalculator::compute_net(
            &[
                record(Decimal::MAX, "A", "A,B"),
                record(Decimal::MAX, "A", "A,B"),
                record(dec!(10), "B", "A,B"),
            ],
            &roster(&["A", "B"]),
        );
        let a = balances.get("A").unwrap();
        let b = balances.get("B").unwrap();
        assert_eq!(a.paid, Decimal::MAX);
        assert_eq!(b.paid, dec!(10));
        assert_eq!(a.owed, b.owed);
        assert!(a.net() > Decimal::ZERO);
        assert!(b.net() < Decimal::ZERO);
        assert!(balances.total_net().abs() <= Decimal::ONE);
    }

    #[test]
    fn test_owed_overflow_leaves_payer_untouched() {
        // Bob's owed total is already at the limit, so the second record
        // cannot be applied; Carol's payment must not be counted either.
        let balances = NetBalanceCalculator::compute_net(
            &[
                record(Decimal::MAX, "Alice", "Bob"),
                record(dec!(10), "Carol", "Bob"),
            ],
            &roster(&["Alice", "Bob", "Carol"]),
        );
        assert_eq!(balances.get("Bob").unwrap().owed, Decimal::MAX);
        assert_eq!(balances.get("Carol").unwrap().paid, Decimal::ZERO);
        assert_eq!(balances.total_net(), Decimal::ZERO);
    }
}
