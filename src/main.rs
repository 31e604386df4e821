//! trip-settle CLI
//!
//! Settle shared trip expenses from the command line.
//!
//! # Usage
//!
//! ```bash
//! # One settlement matrix per currency
//! trip-settle settle --input trip.json
//!
//! # A single currency, as JSON
//! trip-settle settle --input trip.json --currency TWD --format json
//!
//! # Everything converted into one currency with manual rates
//! trip-settle convert --input trip.json --base USD --rate TWD=0.031 --rate EUR=1.1
//!
//! # Check every expense against the roster
//! trip-settle validate --input trip.json
//!
//! # Generate a random trip for testing
//! trip-settle generate --participants 6 --expenses 40
//! ```

use log::info;
use rust_decimal::Decimal;
use std::fs;
use std::process;
use trip_settle::core::currency::CurrencyCode;
use trip_settle::core::expense::coerce_amount;
use trip_settle::engine::views::{SettlementView, ViewBuilder};
use trip_settle::input::{Trip, TripFile};
use trip_settle::simulation::trip_generator::{generate_trip, GeneratorConfig};

fn print_usage() {
    eprintln!(
        r#"trip-settle — shared trip expenses, balances and settlements

USAGE:
    trip-settle <COMMAND> [OPTIONS]

COMMANDS:
    settle      Settlement matrix per currency (or for one currency)
    convert     Settlement after converting everything into a base currency
    validate    Report expenses with unknown names or no participants
    generate    Generate a random trip (for testing)
    help        Show this message

OPTIONS (settle, convert, validate):
    --input <FILE>      Path to JSON trip file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (settle):
    --currency <CODE>   Only settle expenses in this currency

OPTIONS (convert):
    --base <CODE>       Base currency (default: the file's FX base, else USD)
    --rate <CODE=RATE>  1 CODE = RATE base; repeatable, overrides the file

OPTIONS (generate):
    --participants <N>  Number of participants (default: 5)
    --expenses <N>      Number of expenses (default: 20)
    --currencies <LIST> Comma-separated currency codes (default: USD)
    --output <FILE>     Write to file instead of stdout

Set RUST_LOG=debug to trace individual transfers."#
    );
}

/// JSON output schema for one settlement view.
#[derive(serde::Serialize)]
struct ViewOutput {
    currency: String,
    records: usize,
    dropped: usize,
    balances: Vec<BalanceOutput>,
    transfers: Vec<TransferOutput>,
}

#[derive(serde::Serialize)]
struct BalanceOutput {
    participant: String,
    paid: String,
    owed: String,
    net: String,
}

#[derive(serde::Serialize)]
struct TransferOutput {
    from: String,
    to: String,
    amount: String,
}

impl From<&SettlementView> for ViewOutput {
    fn from(view: &SettlementView) -> Self {
        ViewOutput {
            currency: view.currency.to_string(),
            records: view.record_count,
            dropped: view.dropped_count,
            balances: view
                .balances
                .iter()
                .map(|(name, b)| BalanceOutput {
                    participant: name.to_string(),
                    paid: b.paid.round_dp(2).to_string(),
                    owed: b.owed.round_dp(2).to_string(),
                    net: b.net().round_dp(2).to_string(),
                })
                .collect(),
            transfers: view
                .matrix
                .transfers()
                .into_iter()
                .map(|t| TransferOutput {
                    from: t.from.to_string(),
                    to: t.to.to_string(),
                    amount: t.amount.round_dp(2).to_string(),
                })
                .collect(),
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn load_trip(path: &str) -> Trip {
    TripFile::load(path)
        .and_then(TripFile::into_trip)
        .unwrap_or_else(|e| fail(e))
}

fn print_view(view: &SettlementView) {
    println!("=== {} ===", view.currency);
    if view.is_empty() {
        println!("No records.\n");
        return;
    }
    println!("Records: {}", view.record_count);
    if view.dropped_count > 0 {
        println!("Skipped: {} (no FX rate)", view.dropped_count);
    }
    println!();
    for (name, balance) in view.balances.iter() {
        println!(
            "  {:<15} paid {:>12}  owed {:>12}  net {:>12}",
            name.as_str(),
            balance.paid.round_dp(2),
            balance.owed.round_dp(2),
            balance.net().round_dp(2)
        );
    }
    println!();
    print!("{}", view.matrix);
    println!();
}

fn print_views(views: &[SettlementView], format: &str) {
    if format == "json" {
        let output: Vec<ViewOutput> = views.iter().map(ViewOutput::from).collect();
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
    } else if views.is_empty() {
        println!("No currency data.");
    } else {
        for view in views {
            print_view(view);
        }
    }
}

/// Common options shared by the commands that read a trip file.
#[derive(Default)]
struct Options {
    input: Option<String>,
    format: String,
    currency: Option<String>,
    base: Option<String>,
    rates: Vec<(String, Decimal)>,
}

fn parse_options(args: &[String], allowed: &[&str]) -> Options {
    let mut opts = Options {
        format: "text".to_string(),
        ..Default::default()
    };
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        if !allowed.contains(&flag) {
            fail(format!("Unknown option: {}", flag));
        }
        i += 1;
        let value = args
            .get(i)
            .cloned()
            .unwrap_or_else(|| fail(format!("{} requires a value", flag)));
        match flag {
            "--input" => opts.input = Some(value),
            "--format" => opts.format = value,
            "--currency" => opts.currency = Some(value),
            "--base" => opts.base = Some(value),
            "--rate" => {
                let (code, rate) = value
                    .split_once('=')
                    .unwrap_or_else(|| fail("--rate expects CODE=RATE"));
                opts.rates.push((code.trim().to_string(), coerce_amount(rate)));
            }
            _ => unreachable!("flag checked against allowed list"),
        }
        i += 1;
    }
    if opts.format != "text" && opts.format != "json" {
        fail("--format requires 'text' or 'json'");
    }
    opts
}

fn require_input(opts: &Options) -> Trip {
    let path = opts
        .input
        .as_deref()
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    load_trip(path)
}

fn cmd_settle(args: &[String]) {
    let opts = parse_options(args, &["--input", "--format", "--currency"]);
    let trip = require_input(&opts);
    let builder = ViewBuilder::new(&trip.ledger, &trip.roster);

    let views = match &opts.currency {
        Some(code) => {
            let mut config = trip.config.clone();
            if let Err(e) = config.select_currency(CurrencyCode::new(code.as_str())) {
                fail(e);
            }
            vec![builder.selected(&config)]
        }
        None => builder.per_currency(),
    };
    info!("settled {} view(s)", views.len());
    print_views(&views, &opts.format);
}

fn cmd_convert(args: &[String]) {
    let opts = parse_options(args, &["--input", "--format", "--base", "--rate"]);
    let trip = require_input(&opts);

    let mut fx = trip.config.fx.clone();
    if let Some(base) = &opts.base {
        fx.rebase(CurrencyCode::new(base.as_str()));
    }
    for (code, rate) in &opts.rates {
        let currency = CurrencyCode::new(code.as_str());
        if currency == *fx.base() {
            continue;
        }
        if let Err(e) = fx.set_rate(currency, *rate) {
            fail(e);
        }
    }

    let missing = fx.missing_rates(&trip.ledger.currencies());
    if !missing.is_empty() {
        let codes: Vec<String> = missing.iter().map(|c| c.to_string()).collect();
        eprintln!(
            "Warning: no FX rate for {}. Set one with --rate {}=<RATE> (1 {} = ? {}).",
            codes.join(", "),
            codes[0],
            codes[0],
            fx.base()
        );
    }

    let view = ViewBuilder::new(&trip.ledger, &trip.roster).converted(&fx);
    print_views(&[view], &opts.format);
}

fn cmd_validate(args: &[String]) {
    let opts = parse_options(args, &["--input", "--format"]);
    let trip = require_input(&opts);

    #[derive(serde::Serialize)]
    struct Problem {
        index: usize,
        id: String,
        error: String,
    }

    let problems: Vec<Problem> = trip
        .ledger
        .records()
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            record.validate(&trip.roster).err().map(|e| Problem {
                index,
                id: record.id().to_string(),
                error: e.to_string(),
            })
        })
        .collect();

    if opts.format == "json" {
        match serde_json::to_string_pretty(&problems) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
    } else if problems.is_empty() {
        println!("All {} expenses are valid.", trip.ledger.len());
    } else {
        for p in &problems {
            println!("  expense {}: {}", p.index, p.error);
        }
        println!("\n{} of {} expenses have problems.", problems.len(), trip.ledger.len());
    }

    if !problems.is_empty() {
        process::exit(2);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = GeneratorConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        let value = args
            .get(i)
            .cloned()
            .unwrap_or_else(|| fail(format!("{} requires a value", flag)));
        match flag {
            "--participants" => {
                config.participant_count = value
                    .parse()
                    .unwrap_or_else(|_| fail("--participants requires a number"));
            }
            "--expenses" => {
                config.expense_count = value
                    .parse()
                    .unwrap_or_else(|_| fail("--expenses requires a number"));
            }
            "--currencies" => {
                config.currencies = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(CurrencyCode::new)
                    .collect();
            }
            "--output" => output_path = Some(value),
            _ => fail(format!("Unknown option: {}", flag)),
        }
        i += 1;
    }

    let generated = generate_trip(&config);
    let trip = Trip {
        roster: generated.roster,
        ledger: generated.ledger,
        config: Default::default(),
    };
    let json = serde_json::to_string_pretty(&TripFile::from_trip(&trip))
        .unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("cannot write '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses across {} participants → {}",
            trip.ledger.len(),
            trip.roster.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "settle" => cmd_settle(rest),
        "convert" => cmd_convert(rest),
        "validate" => cmd_validate(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
