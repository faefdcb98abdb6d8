use balance_engine::core::expense::{ExpenseSplit, SharedExpense};
use balance_engine::core::member::{Member, MemberId};
use balance_engine::core::settlement::Settlement;
use balance_engine::optimization::settlement::SettlementEngine;
use balance_engine::optimization::split::{split_by_weights, split_equally};
use chrono::NaiveDate;
use proptest::prelude::*;
use uuid::Uuid;

const POOL: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
}

/// A group history built from valid expenses and settlements.
#[derive(Debug, Clone)]
struct Group {
    members: Vec<Member>,
    splits: Vec<ExpenseSplit>,
    settlements: Vec<Settlement>,
}

/// Raw expense: payer index, total, participant bitmask.
fn arb_expense() -> impl Strategy<Value = (usize, i64, u8)> {
    (0usize..6, 1i64..1_000_000, 1u8..64)
}

/// Raw settlement: from index, to index, amount.
fn arb_settlement() -> impl Strategy<Value = (usize, usize, i64)> {
    (0usize..6, 0usize..6, 1i64..500_000)
}

/// Generate a group of 2..=6 members with consistent expenses.
fn arb_group() -> impl Strategy<Value = Group> {
    (
        2usize..=6,
        prop::collection::vec(arb_expense(), 0..30),
        prop::collection::vec(arb_settlement(), 0..10),
    )
        .prop_map(|(size, raw_expenses, raw_settlements)| {
            let members: Vec<Member> = POOL[..size]
                .iter()
                .map(|id| Member::new(*id, id.to_uppercase()))
                .collect();
            let ids: Vec<MemberId> = members.iter().map(|m| m.id.clone()).collect();

            let mut splits = Vec::new();
            for (payer, total, mask) in raw_expenses {
                let participants: Vec<MemberId> = ids
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, id)| id.clone())
                    .collect();
                if participants.is_empty() {
                    continue;
                }
                let expense = SharedExpense::split_equally(
                    "generated",
                    total,
                    date(),
                    &ids[payer % size],
                    &participants,
                )
                .unwrap();
                splits.extend(expense.splits().iter().cloned());
            }

            let settlements = raw_settlements
                .into_iter()
                .filter_map(|(from, to, amount)| {
                    Settlement::record(ids[from % size].clone(), ids[to % size].clone(), amount, date())
                        .ok()
                })
                .collect();

            Group {
                members,
                splits,
                settlements,
            }
        })
}

fn sorted_triples(group: &Group) -> Vec<(String, String, i64)> {
    let mut triples: Vec<_> =
        SettlementEngine::suggest_settlements(&group.members, &group.splits, &group.settlements)
            .unwrap()
            .into_iter()
            .map(|s| (s.from.id.to_string(), s.to.id.to_string(), s.amount))
            .collect();
    triples.sort();
    triples
}

proptest! {
    // Suggested amounts add up to the total imbalance, and the imbalance
    // is the same seen from creditors or debtors.
    #[test]
    fn suggestions_conserve_imbalance(group in arb_group()) {
        let plan = SettlementEngine::plan(&group.members, &group.splits, &group.settlements).unwrap();

        let credit: i64 = plan.ledger().iter()
            .map(|(_, p)| p.settlements_needed())
            .filter(|n| *n > 0)
            .sum();
        let debt: i64 = plan.ledger().iter()
            .map(|(_, p)| p.settlements_needed())
            .filter(|n| *n < 0)
            .map(|n| -n)
            .sum();

        prop_assert_eq!(credit, debt);
        prop_assert_eq!(plan.suggested_total(), credit);
        prop_assert_eq!(plan.outstanding(), credit);
    }

    #[test]
    fn no_self_settlement(group in arb_group()) {
        let result = SettlementEngine::suggest_settlements(&group.members, &group.splits, &group.settlements).unwrap();
        for s in &result {
            prop_assert_ne!(&s.from.id, &s.to.id);
        }
    }

    #[test]
    fn amounts_are_positive(group in arb_group()) {
        let result = SettlementEngine::suggest_settlements(&group.members, &group.splits, &group.settlements).unwrap();
        prop_assert!(result.iter().all(|s| s.amount > 0));
    }

    #[test]
    fn computation_is_idempotent(group in arb_group()) {
        prop_assert_eq!(sorted_triples(&group), sorted_triples(&group));
    }

    #[test]
    fn zero_net_members_drop_out(group in arb_group()) {
        let plan = SettlementEngine::plan(&group.members, &group.splits, &group.settlements).unwrap();
        for (member, position) in plan.ledger().iter() {
            if position.settlements_needed() == 0 {
                prop_assert!(plan
                    .suggestions()
                    .iter()
                    .all(|s| &s.from.id != member && &s.to.id != member));
            }
        }
    }

    // Recording every suggestion as a settlement leaves nothing to settle.
    #[test]
    fn acting_on_suggestions_settles_group(group in arb_group()) {
        let result = SettlementEngine::suggest_settlements(&group.members, &group.splits, &group.settlements).unwrap();

        let mut settlements = group.settlements.clone();
        settlements.extend(result.iter().map(|s| {
            Settlement::from_parts(Uuid::new_v4(), s.from.id.clone(), s.to.id.clone(), s.amount, date())
        }));

        let after = SettlementEngine::suggest_settlements(&group.members, &group.splits, &settlements).unwrap();
        prop_assert!(after.is_empty());
    }

    #[test]
    fn equal_split_is_exact(total in 0i64..10_000_000, n in 1usize..50) {
        let shares = split_equally(total, n).unwrap();
        prop_assert_eq!(shares.len(), n);
        prop_assert_eq!(shares.iter().sum::<i64>(), total);
        let max = *shares.iter().max().unwrap();
        let min = *shares.iter().min().unwrap();
        prop_assert!(max - min <= 1);
    }

    #[test]
    fn weighted_split_is_exact(
        total in 0i64..10_000_000,
        weights in prop::collection::vec(1u32..100, 1..10),
    ) {
        let shares = split_by_weights(total, &weights).unwrap();
        prop_assert_eq!(shares.iter().sum::<i64>(), total);
        prop_assert!(shares.iter().all(|s| *s >= 0));
    }
}

#[test]
fn empty_history_yields_no_suggestions() {
    let members = vec![Member::new("a", "Ann"), Member::new("b", "Ben")];
    let result = SettlementEngine::suggest_settlements(&members, &[], &[]).unwrap();
    assert!(result.is_empty());

    let result = SettlementEngine::suggest_settlements(&[], &[], &[]).unwrap();
    assert!(result.is_empty());
}
