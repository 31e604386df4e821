//! Road trip settlement example.
//!
//! Three friends share fuel, food and a hotel, then settle up in one
//! currency per settlement matrix.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use trip_settle::prelude::*;

fn main() {
    println!("╔══════════════════════════════════════╗");
    println!("║  trip-settle: Road Trip Example      ║");
    println!("╚══════════════════════════════════════╝\n");

    let roster = ParticipantRoster::from_names(["Alice", "Bob", "Carol"]).unwrap();
    let usd = CurrencyCode::new("USD");
    let day = |d| NaiveDate::from_ymd_opt(2024, 7, d).unwrap();

    let everyone = ["Alice", "Bob", "Carol"];

    let mut ledger = ExpenseLedger::new();
    ledger.add(ExpenseRecord::new(day(1), "Fuel", dec!(90), "Alice", everyone, usd.clone()));
    ledger.add(ExpenseRecord::new(day(1), "Lunch", dec!(45.60), "Bob", everyone, usd.clone()));
    ledger.add(ExpenseRecord::new(day(2), "Hotel", dec!(210), "Carol", everyone, usd.clone()));
    ledger.add(ExpenseRecord::new(
        day(2),
        "Museum",
        dec!(30),
        "Alice",
        ["Alice", "Bob"],
        usd.clone(),
    ));

    // --- Net positions ---
    println!("━━━ Net Positions ━━━\n");
    let balances = NetBalanceCalculator::compute_net(ledger.records(), &roster);
    for (name, balance) in balances.iter() {
        let status = if balance.net() > dec!(0) {
            "IS OWED"
        } else if balance.net() < dec!(0) {
            "OWES"
        } else {
            "SQUARE"
        };
        println!(
            "  {:<8} paid {:>8}  owed {:>8}  net {:>8}  [{}]",
            name.as_str(),
            balance.paid.round_dp(2),
            balance.owed.round_dp(2),
            balance.net().round_dp(2),
            status
        );
    }

    // --- Settlement ---
    println!("\n━━━ Settlement ━━━\n");
    let matrix = SettlementReducer::reduce_to_settlement(&balances.net_map(), &roster);
    print!("{}", matrix);
    println!();
    for t in matrix.transfers() {
        println!("  {} pays {} {} {}", t.from, t.to, t.amount.round_dp(2), usd);
    }
}
