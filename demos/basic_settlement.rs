//! Basic group settlement example.
//!
//! Shows how shared expenses and a recorded payment turn into
//! suggested settlements.

use balance_engine::core::amount::format_minor;
use balance_engine::core::expense::SharedExpense;
use balance_engine::core::member::{Member, MemberId};
use balance_engine::core::settlement::Settlement;
use balance_engine::optimization::settlement::SettlementEngine;
use balance_engine::optimization::summary::BalanceSummary;
use chrono::NaiveDate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  balance-engine: Basic Group Settlement       ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    let members = vec![
        Member::new("alice", "Alice"),
        Member::new("bob", "Bob"),
        Member::new("carol", "Carol"),
        Member::new("dave", "Dave"),
    ];
    let ids: Vec<MemberId> = members.iter().map(|m| m.id.clone()).collect();
    let day = |d| NaiveDate::from_ymd_opt(2024, 8, d).ok_or("invalid date");

    // --- Shared expenses ---
    let expenses = vec![
        SharedExpense::split_equally("Cabin", 48_000, day(1)?, &ids[0], &ids)?,
        SharedExpense::split_equally("Groceries", 12_345, day(2)?, &ids[1], &ids)?,
        SharedExpense::split_equally("Boat rental", 9_000, day(3)?, &ids[2], &ids[1..])?,
    ];
    for expense in &expenses {
        println!("  {:<12} {:>10}", expense.description(), format_minor(expense.total()));
    }
    println!();

    // --- A payment already made ---
    let settlements = vec![Settlement::record(ids[3].clone(), ids[0].clone(), 5_000, day(4)?)?];
    println!("  Dave already paid Alice {}\n", format_minor(5_000));

    let splits: Vec<_> = expenses.iter().flat_map(|e| e.splits().to_vec()).collect();
    let plan = SettlementEngine::plan(&members, &splits, &settlements)?;

    println!("{}", BalanceSummary::from_plan(&plan));
    Ok(())
}
