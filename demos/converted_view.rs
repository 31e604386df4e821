//! Multi-currency trip example.
//!
//! Shows the per-currency settlement matrices and a single matrix after
//! converting everything into USD with manually entered rates.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use trip_settle::prelude::*;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  trip-settle: Multi-Currency Example     ║");
    println!("╚══════════════════════════════════════════╝\n");

    let roster = ParticipantRoster::from_names(["Mei", "Jonas", "Priya", "Tom"]).unwrap();
    let day = |d| NaiveDate::from_ymd_opt(2024, 9, d).unwrap();
    let everyone = ["Mei", "Jonas", "Priya", "Tom"];

    let usd = CurrencyCode::new("USD");
    let twd = CurrencyCode::new("TWD");
    let eur = CurrencyCode::new("EUR");

    let mut ledger = ExpenseLedger::new();
    ledger.add(ExpenseRecord::new(day(3), "Flights", dec!(1200), "Tom", everyone, usd));
    ledger.add(ExpenseRecord::new(
        day(4),
        "Night market",
        dec!(2400),
        "Mei",
        everyone,
        twd.clone(),
    ));
    ledger.add(ExpenseRecord::new(
        day(5),
        "High-speed rail",
        dec!(5960),
        "Mei",
        ["Mei", "Priya"],
        twd,
    ));
    ledger.add(ExpenseRecord::new(
        day(8),
        "Berlin hostel",
        dec!(320),
        "Jonas",
        everyone,
        eur.clone(),
    ));
    ledger.add(ExpenseRecord::new(
        day(9),
        "Museum pass",
        dec!(58),
        "Priya",
        ["Jonas", "Priya"],
        eur,
    ));

    let builder = ViewBuilder::new(&ledger, &roster);

    // --- Scenario 1: one matrix per currency ---
    println!("━━━ Scenario 1: Per-Currency Settlement ━━━\n");
    for view in builder.per_currency() {
        println!("--- {} ({} records) ---", view.currency, view.record_count);
        print!("{}", view.matrix);
        println!();
    }

    // --- Scenario 2: converted into USD ---
    println!("━━━ Scenario 2: Converted to USD ━━━\n");
    let mut fx = FxRates::new(CurrencyCode::new("USD"));
    fx.set_rate(CurrencyCode::new("TWD"), dec!(0.031)).unwrap();

    let missing = fx.missing_rates(&ledger.currencies());
    if !missing.is_empty() {
        println!("Missing rates for {:?}; those records are skipped.\n", missing);
    }
    let partial = builder.converted(&fx);
    println!("Records used: {}, skipped: {}", partial.record_count, partial.dropped_count);
    print!("{}", partial.matrix);
    println!();

    fx.set_rate(CurrencyCode::new("EUR"), dec!(1.09)).unwrap();
    let full = builder.converted(&fx);
    println!("With EUR = 1.09 USD:");
    print!("{}", full.matrix);
    for t in full.matrix.transfers() {
        println!("  {} pays {} {} USD", t.from, t.to, t.amount.round_dp(2));
    }
}
