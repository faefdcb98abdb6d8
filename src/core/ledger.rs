use crate::core::amount::MinorUnits;
use crate::core::member::MemberId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A member's aggregated stake in the group.
///
/// `payments` is everything the member paid toward shared expenses, plus
/// settlements they sent, minus settlements they received. `debts` is
/// everything they owe across shared expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPosition {
    pub payments: MinorUnits,
    pub debts: MinorUnits,
}

impl NetPosition {
    /// `payments - debts`. Positive means the member is owed money.
    ///
    /// Saturates at the `i64` bounds; [`NetPosition::checked_net`] reports
    /// overflow instead.
    pub fn settlements_needed(&self) -> MinorUnits {
        self.payments.saturating_sub(self.debts)
    }

    /// `payments - debts`, or `None` on overflow.
    pub fn checked_net(&self) -> Option<MinorUnits> {
        self.payments.checked_sub(self.debts)
    }

    pub fn is_creditor(&self) -> bool {
        self.settlements_needed() > 0
    }
}

/// Per-member net positions, kept in first-seen order.
///
/// Iteration order is the order in which members were first added, which
/// makes the greedy matcher reproducible across runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ledger {
    entries: Vec<(MemberId, NetPosition)>,
    #[serde(skip)]
    index: HashMap<MemberId, usize>,
}

/// Arithmetic overflow while updating a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOverflow;

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member with a zero position if not already present.
    /// Returns the member's slot.
    pub fn ensure(&mut self, member: &MemberId) -> usize {
        if let Some(&slot) = self.index.get(member) {
            return slot;
        }
        let slot = self.entries.len();
        self.entries.push((member.clone(), NetPosition::default()));
        self.index.insert(member.clone(), slot);
        slot
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.index.contains_key(member)
    }

    /// Record a split: the member paid `paid` and owes `owed`.
    pub fn apply_split(
        &mut self,
        member: &MemberId,
        paid: MinorUnits,
        owed: MinorUnits,
    ) -> Result<(), PositionOverflow> {
        let slot = self.ensure(member);
        let position = &mut self.entries[slot].1;
        position.payments = position.payments.checked_add(paid).ok_or(PositionOverflow)?;
        position.debts = position.debts.checked_add(owed).ok_or(PositionOverflow)?;
        Ok(())
    }

    /// Record a settlement between two members already in the ledger.
    ///
    /// The payer's payments grow and the payee's shrink. Returns `Ok(false)`
    /// without touching anything if either member is missing; the engine
    /// registers every roster member first, so it never sees `false`.
    pub fn apply_settlement(
        &mut self,
        from: &MemberId,
        to: &MemberId,
        amount: MinorUnits,
    ) -> Result<bool, PositionOverflow> {
        let (Some(&from_slot), Some(&to_slot)) = (self.index.get(from), self.index.get(to)) else {
            return Ok(false);
        };

        let to_payments = self.entries[to_slot]
            .1
            .payments
            .checked_sub(amount)
            .ok_or(PositionOverflow)?;
        self.entries[to_slot].1.payments = to_payments;

        let from_payments = self.entries[from_slot]
            .1
            .payments
            .checked_add(amount)
            .ok_or(PositionOverflow)?;
        self.entries[from_slot].1.payments = from_payments;
        Ok(true)
    }

    /// The position of a member, zero if unknown.
    pub fn position(&self, member: &MemberId) -> NetPosition {
        self.index
            .get(member)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or_default()
    }

    /// All positions in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, &NetPosition)> {
        self.entries.iter().map(|(member, position)| (member, position))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every member's net position. Zero for consistent input.
    pub fn imbalance(&self) -> Option<MinorUnits> {
        self.entries
            .iter()
            .try_fold(0i64, |acc, (_, p)| acc.checked_add(p.checked_net()?))
    }

    /// Verify that credits and debits cancel out.
    pub fn is_balanced(&self) -> bool {
        self.imbalance() == Some(0)
    }

    /// Total owed to net creditors (equals total owed by net debtors when
    /// balanced), or `None` on overflow.
    pub fn total_outstanding(&self) -> Option<MinorUnits> {
        self.entries.iter().try_fold(0i64, |acc, (_, p)| {
            let net = p.checked_net()?;
            if net > 0 {
                acc.checked_add(net)
            } else {
                Some(acc)
            }
        })
    }
}
