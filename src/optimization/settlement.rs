use crate::core::amount::{checked_sum, MinorUnits};
use crate::core::expense::ExpenseSplit;
use crate::core::ledger::Ledger;
use crate::core::member::{Member, MemberId};
use crate::core::settlement::Settlement;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The record that referenced a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Split { expense_id: Uuid },
    Settlement { settlement_id: Uuid },
    /// A computed net position with no matching member record. Only a
    /// ledger built outside [`SettlementEngine::net_positions`] can hit it.
    Position,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Split { expense_id } => write!(f, "split of expense {}", expense_id),
            Reference::Settlement { settlement_id } => write!(f, "settlement {}", settlement_id),
            Reference::Position => write!(f, "net position"),
        }
    }
}

/// Errors that abort a balance computation.
///
/// None of these are transient: they point at inconsistent group data, so
/// no partial result is ever returned alongside them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("member {member} referenced by {referenced_by} is not part of the group")]
    UnknownMember {
        member: MemberId,
        referenced_by: Reference,
    },
    #[error("negative {field} of {amount} for member {member}")]
    InvalidAmount {
        member: MemberId,
        field: &'static str,
        amount: MinorUnits,
    },
    #[error("amount overflow while aggregating balances")]
    AmountOverflow,
    #[error("net positions do not cancel out: residual {residual}")]
    Unbalanced { residual: MinorUnits },
}

/// A recommended payment: `from` should pay `to` the given `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedSettlement {
    pub from: Member,
    pub to: Member,
    pub amount: MinorUnits,
}

/// Net positions together with the payments suggested to clear them.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementPlan {
    ledger: Ledger,
    outstanding: MinorUnits,
    suggestions: Vec<SuggestedSettlement>,
}

impl SettlementPlan {
    /// Per-member positions after settlements were applied.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn suggestions(&self) -> &[SuggestedSettlement] {
        &self.suggestions
    }

    pub fn into_suggestions(self) -> Vec<SuggestedSettlement> {
        self.suggestions
    }

    /// Total owed to net creditors, checked when the plan was built.
    pub fn outstanding(&self) -> MinorUnits {
        self.outstanding
    }

    /// Sum of all suggested amounts. Equals [`SettlementPlan::outstanding`].
    pub fn suggested_total(&self) -> MinorUnits {
        self.suggestions
            .iter()
            .fold(0, |acc: MinorUnits, s| acc.saturating_add(s.amount))
    }

    /// True when nothing is left to settle.
    pub fn is_settled(&self) -> bool {
        self.suggestions.is_empty()
    }
}

/// Computes net positions and suggested settlements for a group.
///
/// The engine is a pure function of its inputs. It performs no I/O and
/// keeps no state between calls.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Aggregate splits and recorded settlements into per-member positions.
    ///
    /// Members are ordered by first appearance in `splits`, followed by
    /// declared members that have no splits.
    pub fn net_positions(
        members: &[Member],
        splits: &[ExpenseSplit],
        settlements: &[Settlement],
    ) -> Result<Ledger, BalanceError> {
        let roster: HashSet<&MemberId> = members.iter().map(|m| &m.id).collect();
        let mut ledger = Ledger::new();

        for split in splits {
            let referenced_by = Reference::Split {
                expense_id: split.expense_id,
            };
            if !roster.contains(&split.member) {
                return Err(BalanceError::UnknownMember {
                    member: split.member.clone(),
                    referenced_by,
                });
            }
            check_non_negative(&split.member, "paid", split.paid)?;
            check_non_negative(&split.member, "owed", split.owed)?;

            ledger
                .apply_split(&split.member, split.paid, split.owed)
                .map_err(|_| BalanceError::AmountOverflow)?;
        }

        for member in members {
            ledger.ensure(&member.id);
        }

        for settlement in settlements {
            let referenced_by = Reference::Settlement {
                settlement_id: settlement.id(),
            };
            for member in [settlement.from(), settlement.to()] {
                if !roster.contains(member) {
                    return Err(BalanceError::UnknownMember {
                        member: member.clone(),
                        referenced_by,
                    });
                }
            }
            check_non_negative(settlement.from(), "settlement amount", settlement.amount())?;

            let applied = ledger
                .apply_settlement(settlement.from(), settlement.to(), settlement.amount())
                .map_err(|_| BalanceError::AmountOverflow)?;
            // Roster members were all ensured above.
            debug_assert!(applied);
            if !applied {
                return Err(BalanceError::UnknownMember {
                    member: settlement.from().clone(),
                    referenced_by,
                });
            }
        }

        Ok(ledger)
    }

    /// Compute net positions and greedily match creditors against debtors.
    ///
    /// # Algorithm
    ///
    /// 1. Aggregate payments and debts per member, then apply settlements.
    /// 2. Members with a positive net are creditors, the rest are debtors.
    /// 3. For each creditor in ledger order, walk the debtors in ledger order
    ///    and move `min(credit, |debt|)` from each indebted member until the
    ///    credit is exhausted.
    ///
    /// Repeated transfers between the same pair are merged into one
    /// suggestion. The matching is greedy in first-seen order, so the number
    /// of suggestions is not guaranteed to be minimal.
    pub fn plan(
        members: &[Member],
        splits: &[ExpenseSplit],
        settlements: &[Settlement],
    ) -> Result<SettlementPlan, BalanceError> {
        let ledger = Self::net_positions(members, splits, settlements)?;

        let residual = ledger.imbalance().ok_or(BalanceError::AmountOverflow)?;
        if residual != 0 {
            return Err(BalanceError::Unbalanced { residual });
        }

        let directory: HashMap<&MemberId, &Member> = members
            .iter()
            .rev()
            .map(|m| (&m.id, m))
            .collect();

        let mut creditors: Vec<(&Member, MinorUnits)> = Vec::new();
        let mut debtors: Vec<(&Member, MinorUnits)> = Vec::new();
        for (id, position) in ledger.iter() {
            let member = directory
                .get(id)
                .copied()
                .ok_or_else(|| BalanceError::UnknownMember {
                    member: id.clone(),
                    referenced_by: Reference::Position,
                })?;
            let net = position.checked_net().ok_or(BalanceError::AmountOverflow)?;
            if net > 0 {
                creditors.push((member, net));
            } else {
                debtors.push((member, net));
            }
        }

        // Bounds every transfer and every derived total. Debts sum to the
        // same figure since the ledger is balanced.
        let outstanding = checked_sum(creditors.iter().map(|(_, credit)| *credit))
            .ok_or(BalanceError::AmountOverflow)?;

        // (debtor slot, creditor slot, amount) in creation order
        let mut transfers: Vec<(usize, usize, MinorUnits)> = Vec::new();
        let mut pair_index: HashMap<(usize, usize), usize> = HashMap::new();

        for (creditor_slot, (_, credit)) in creditors.iter_mut().enumerate() {
            while *credit > 0 {
                let mut progressed = false;

                for (debtor_slot, (_, debt)) in debtors.iter_mut().enumerate() {
                    if *credit == 0 {
                        break;
                    }
                    if *debt >= 0 {
                        continue;
                    }

                    let outstanding = debt.checked_neg().ok_or(BalanceError::AmountOverflow)?;
                    let amount = (*credit).min(outstanding);

                    match pair_index.get(&(debtor_slot, creditor_slot)) {
                        Some(&i) => {
                            transfers[i].2 = transfers[i]
                                .2
                                .checked_add(amount)
                                .ok_or(BalanceError::AmountOverflow)?;
                        }
                        None => {
                            pair_index.insert((debtor_slot, creditor_slot), transfers.len());
                            transfers.push((debtor_slot, creditor_slot, amount));
                        }
                    }

                    *credit -= amount;
                    *debt += amount;
                    progressed = true;
                }

                if !progressed {
                    return Err(BalanceError::Unbalanced { residual: *credit });
                }
            }
        }

        let suggestions = transfers
            .into_iter()
            .filter(|(_, _, amount)| *amount > 0)
            .map(|(debtor_slot, creditor_slot, amount)| SuggestedSettlement {
                from: debtors[debtor_slot].0.clone(),
                to: creditors[creditor_slot].0.clone(),
                amount,
            })
            .collect();

        Ok(SettlementPlan {
            ledger,
            outstanding,
            suggestions,
        })
    }

    /// Suggested payments that zero out every member's net position.
    pub fn suggest_settlements(
        members: &[Member],
        splits: &[ExpenseSplit],
        settlements: &[Settlement],
    ) -> Result<Vec<SuggestedSettlement>, BalanceError> {
        Self::plan(members, splits, settlements).map(SettlementPlan::into_suggestions)
    }
}

fn check_non_negative(
    member: &MemberId,
    field: &'static str,
    amount: MinorUnits,
) -> Result<(), BalanceError> {
    if amount < 0 {
        return Err(BalanceError::InvalidAmount {
            member: member.clone(),
            field,
            amount,
        });
    }
    Ok(())
}

impl fmt::Display for SuggestedSettlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pays {} {}",
            self.from,
            self.to,
            crate::core::amount::format_minor(self.amount)
        )
    }
}
