use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use trip_settle::core::currency::CurrencyCode;
use trip_settle::core::expense::ExpenseRecord;
use trip_settle::core::participant::ParticipantName;
use trip_settle::core::roster::ParticipantRoster;
use trip_settle::engine::balance::NetBalanceCalculator;
use trip_settle::engine::settlement::SettlementReducer;

const NAMES: [&str; 6] = ["Alice", "Bob", "Carol", "Dan", "Erin", "Frank"];

fn roster() -> ParticipantRoster {
    ParticipantRoster::from_names(NAMES).unwrap()
}

fn epsilon() -> Decimal {
    Decimal::new(1, 9)
}

/// Generate a random participant name from the roster.
fn arb_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(NAMES.to_vec())
}

/// Generate a random amount in cents (0.00 to 10,000.00).
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generate an expense whose payer and participants all sit on the roster.
fn arb_expense() -> impl Strategy<Value = ExpenseRecord> {
    (
        arb_amount(),
        arb_name(),
        prop::sample::subsequence(NAMES.to_vec(), 1..=NAMES.len()),
    )
        .prop_map(|(amount, payer, participants)| {
            ExpenseRecord::new(
                NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                "expense",
                amount,
                payer,
                participants,
                CurrencyCode::new("USD"),
            )
        })
}

fn arb_expenses() -> impl Strategy<Value = Vec<ExpenseRecord>> {
    prop::collection::vec(arb_expense(), 0..40)
}

/// Generate a net map that sums to zero: random debits, one balancing credit.
fn arb_net_map() -> impl Strategy<Value = HashMap<ParticipantName, Decimal>> {
    prop::collection::vec(-1_000_000i64..1_000_000i64, NAMES.len() - 1).prop_map(|cents| {
        let mut net: HashMap<ParticipantName, Decimal> = NAMES
            .iter()
            .zip(cents.iter())
            .map(|(n, c)| (ParticipantName::new(*n), Decimal::new(*c, 2)))
            .collect();
        let total: Decimal = net.values().copied().sum();
        net.insert(ParticipantName::new(NAMES[NAMES.len() - 1]), -total);
        net
    })
}

proptest! {
    // ===================================================================
    // Net positions sum to zero when every name is on the roster.
    // ===================================================================
    #[test]
    fn net_positions_are_conserved(records in arb_expenses()) {
        let balances = NetBalanceCalculator::compute_net(&records, &roster());
        let total = balances.total_net();
        let tolerance = epsilon() * Decimal::from(records.len().max(1));
        prop_assert!(
            total.abs() <= tolerance,
            "Sum of nets {} must be within {}",
            total,
            tolerance
        );
        assert_abs_diff_eq!(total.to_f64().unwrap_or(f64::NAN), 0.0, epsilon = 1e-6);
    }

    // ===================================================================
    // Paid totals equal the ledger's gross total.
    // ===================================================================
    #[test]
    fn paid_matches_gross(records in arb_expenses()) {
        let balances = NetBalanceCalculator::compute_net(&records, &roster());
        let paid: Decimal = balances.iter().map(|(_, b)| b.paid).sum();
        let gross: Decimal = records.iter().map(|r| r.amount()).sum();
        prop_assert_eq!(paid, gross);
    }

    // ===================================================================
    // Each participant's outflow minus inflow cancels their net position.
    // ===================================================================
    #[test]
    fn settlement_cancels_net(net in arb_net_map()) {
        let roster = roster();
        let matrix = SettlementReducer::reduce_to_settlement(&net, &roster);
        for name in roster.iter() {
            let flow = matrix.outgoing(name.as_str()) - matrix.incoming(name.as_str());
            prop_assert!(
                (flow + net[name]).abs() <= epsilon(),
                "{}: flow {} does not cancel net {}",
                name,
                flow,
                net[name]
            );
        }
    }

    // ===================================================================
    // Settlement from computed balances also cancels every position.
    // ===================================================================
    #[test]
    fn settlement_of_expenses_cancels_net(records in arb_expenses()) {
        let roster = roster();
        let balances = NetBalanceCalculator::compute_net(&records, &roster);
        let net = balances.net_map();
        let matrix = SettlementReducer::reduce_to_settlement(&net, &roster);
        let tolerance = epsilon() * Decimal::from(roster.len());
        for name in roster.iter() {
            let flow = matrix.outgoing(name.as_str()) - matrix.incoming(name.as_str());
            prop_assert!((flow + net[name]).abs() <= tolerance);
        }
    }

    // ===================================================================
    // Transfers only go from debtors to creditors, never on the
    // diagonal, and never more than creditors + debtors - 1 of them.
    // ===================================================================
    #[test]
    fn transfers_are_bounded_and_directed(net in arb_net_map()) {
        let roster = roster();
        let matrix = SettlementReducer::reduce_to_settlement(&net, &roster);

        let creditors = net.values().filter(|v| **v > Decimal::ZERO).count();
        let debtors = net.values().filter(|v| **v < Decimal::ZERO).count();
        let bound = (creditors + debtors).saturating_sub(1);
        prop_assert!(matrix.transfer_count() <= bound);

        for t in matrix.transfers() {
            prop_assert!(t.from != t.to);
            prop_assert!(net[&t.from] < Decimal::ZERO);
            prop_assert!(net[&t.to] > Decimal::ZERO);
            prop_assert!(t.amount > Decimal::ZERO);
        }
    }

    // ===================================================================
    // Recomputing from the same inputs gives identical results.
    // ===================================================================
    #[test]
    fn engine_is_deterministic(records in arb_expenses()) {
        let roster = roster();
        let first = NetBalanceCalculator::compute_net(&records, &roster);
        let second = NetBalanceCalculator::compute_net(&records, &roster);
        prop_assert_eq!(&first, &second);

        let m1 = SettlementReducer::reduce_to_settlement(&first.net_map(), &roster);
        let m2 = SettlementReducer::reduce_to_settlement(&second.net_map(), &roster);
        prop_assert_eq!(m1, m2);
    }

    // ===================================================================
    // Blank entries in the participant field never change the split.
    // ===================================================================
    #[test]
    fn blank_tokens_do_not_change_split(
        amount in arb_amount(),
        participants in prop::sample::subsequence(NAMES.to_vec(), 1..=NAMES.len()),
    ) {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let usd = CurrencyCode::new("USD");
        let clean = ExpenseRecord::from_raw(
            date, "x", amount, "Alice", participants.join(","), usd.clone(),
        );
        let noisy = ExpenseRecord::from_raw(
            date, "x", amount, "Alice", format!(" , {} ,, ", participants.join(" ,  , ")), usd,
        );
        prop_assert_eq!(clean.share(), noisy.share());
        prop_assert_eq!(
            NetBalanceCalculator::compute_net(&[clean], &roster()),
            NetBalanceCalculator::compute_net(&[noisy], &roster())
        );
    }
}
