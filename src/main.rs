//! balance-engine CLI
//!
//! Compute group balances and settlement suggestions from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Suggested settlements for a group file
//! balance-engine settle --input group.json
//!
//! # Per-member balances as JSON, asking as a specific member
//! balance-engine summary --input group.json --as alice --format json
//!
//! # Preview how a total splits across members
//! balance-engine split --total 1000 --members 3
//!
//! # Generate a random group for testing
//! balance-engine generate --members 8 --expenses 40
//! ```
//!
//! Log output is controlled with `RUST_LOG` (e.g. `RUST_LOG=debug`).

use balance_engine::core::amount::format_minor;
use balance_engine::core::member::MemberId;
use balance_engine::group::service::GroupBalanceService;
use balance_engine::group::store::{load_group_file, GroupFile, GroupId, InMemoryGroupStore};
use balance_engine::optimization::split::{split_by_weights, split_equally};
use balance_engine::simulation::stress_test::{generate_random_group, GroupConfig};
use log::debug;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"balance-engine — group expense balancing and settlement suggestions

USAGE:
    balance-engine <COMMAND> [OPTIONS]

COMMANDS:
    settle      Suggest payments that settle a group
    summary     Show each member's net position
    split       Preview an equal or weighted split of a total
    generate    Generate a random group file (for testing)
    help        Show this message

OPTIONS (settle, summary):
    --input <FILE>      Path to JSON group file
    --as <MEMBER>       Member making the request (default: first member)
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (split):
    --total <MINOR>     Total in minor units (cents)
    --members <N>       Number of members to split among
    --weights <LIST>    Comma-separated integer weights (overrides --members)

OPTIONS (generate):
    --members <N>       Number of members (default: 5)
    --expenses <N>      Number of shared expenses (default: 20)
    --settlements <N>   Number of recorded settlements (default: 0)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    balance-engine settle --input group.json
    balance-engine summary --input group.json --as alice --format json
    balance-engine split --total 2400 --weights 8,4,3,9
    balance-engine generate --members 8 --expenses 40 --output group.json"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn next_value(args: &[String], i: usize, flag: &str, hint: &str) -> String {
    args.get(i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires {}", flag, hint)))
}

fn parse_number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| fail(format!("{} requires a number", flag)))
}

/// Options shared by the `settle` and `summary` commands.
struct QueryOptions {
    input: String,
    requester: Option<String>,
    json: bool,
}

fn parse_query_options(args: &[String]) -> QueryOptions {
    let mut input = None;
    let mut requester = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input = Some(next_value(args, i, "--input", "a file path"));
            }
            "--as" => {
                i += 1;
                requester = Some(next_value(args, i, "--as", "a member id"));
            }
            "--format" => {
                i += 1;
                format = next_value(args, i, "--format", "'text' or 'json'");
            }
            other => fail(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    let json = match format.as_str() {
        "json" => true,
        "text" => false,
        other => fail(format!("Unknown format: {}", other)),
    };

    QueryOptions {
        input: input.unwrap_or_else(|| fail("--input <FILE> is required")),
        requester,
        json,
    }
}

/// Load the group file into a store and work out who is asking.
fn open_group(options: &QueryOptions) -> (GroupBalanceService<InMemoryGroupStore>, GroupId, MemberId) {
    let snapshot = load_group_file(&options.input).unwrap_or_else(|e| fail(e));
    debug!(
        "Loaded group '{}' with {} expenses from {}",
        snapshot.name,
        snapshot.expenses.len(),
        options.input
    );

    let requester = match &options.requester {
        Some(id) => MemberId::new(id.as_str()),
        None => snapshot
            .members
            .first()
            .map(|m| m.id.clone())
            .unwrap_or_else(|| fail("group has no members")),
    };

    let mut store = InMemoryGroupStore::new();
    let group = store.insert(snapshot);
    (GroupBalanceService::new(store), group, requester)
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

fn cmd_settle(args: &[String]) {
    let options = parse_query_options(args);
    let (service, group, requester) = open_group(&options);

    let views = service
        .suggested_settlements(&requester, &group)
        .unwrap_or_else(|e| fail(e.user_message()));

    if options.json {
        println!("{}", to_json(&views));
    } else if views.is_empty() {
        println!("Everyone is settled up.");
    } else {
        for view in &views {
            println!(
                "{:<20} → {:<20} {:>12}",
                view.from.first_name,
                view.to.first_name,
                format_minor(view.amount)
            );
        }
    }
}

fn cmd_summary(args: &[String]) {
    let options = parse_query_options(args);
    let (service, group, requester) = open_group(&options);

    let summary = service
        .balance_summary(&requester, &group)
        .unwrap_or_else(|e| fail(e.user_message()));

    if options.json {
        println!("{}", to_json(&summary));
    } else {
        println!("{}", summary);
    }
}

fn cmd_split(args: &[String]) {
    let mut total: Option<i64> = None;
    let mut members: Option<usize> = None;
    let mut weights: Option<Vec<u32>> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--total" => {
                i += 1;
                total = Some(parse_number(args, i, "--total"));
            }
            "--members" => {
                i += 1;
                members = Some(parse_number(args, i, "--members"));
            }
            "--weights" => {
                i += 1;
                let list = next_value(args, i, "--weights", "a comma-separated list");
                let parsed = list
                    .split(',')
                    .map(|w| w.trim().parse::<u32>())
                    .collect::<Result<Vec<_>, _>>()
                    .unwrap_or_else(|e| fail(format!("invalid weight: {}", e)));
                weights = Some(parsed);
            }
            other => fail(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    let total = total.unwrap_or_else(|| fail("--total <MINOR> is required"));
    let shares = match (weights, members) {
        (Some(weights), _) => split_by_weights(total, &weights),
        (None, Some(n)) => split_equally(total, n),
        (None, None) => fail("either --members or --weights is required"),
    }
    .unwrap_or_else(|e| fail(e));

    for (n, share) in shares.iter().enumerate() {
        println!("  member {:>3}: {:>12}", n + 1, format_minor(*share));
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = GroupConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                i += 1;
                config.member_count = parse_number(args, i, "--members");
            }
            "--expenses" => {
                i += 1;
                config.expense_count = parse_number(args, i, "--expenses");
            }
            "--settlements" => {
                i += 1;
                config.settlement_count = parse_number(args, i, "--settlements");
            }
            "--output" => {
                i += 1;
                output_path = Some(next_value(args, i, "--output", "a file path"));
            }
            other => fail(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    let snapshot = generate_random_group(&config).unwrap_or_else(|e| fail(e));
    let json = to_json(&GroupFile::from_snapshot(&snapshot));

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("could not write '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses across {} members → {}",
            snapshot.expenses.len(),
            snapshot.members.len(),
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
        "summary" => cmd_summary(rest),
        "split" => cmd_split(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
