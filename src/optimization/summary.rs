use crate::core::amount::{format_minor, MinorUnits};
use crate::core::member::MemberId;
use crate::optimization::settlement::{SettlementPlan, SuggestedSettlement};
use serde::{Deserialize, Serialize};

/// Where a member stands once recorded settlements are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Standing {
    Creditor,
    Debtor,
    Settled,
}

impl Standing {
    pub fn from_net(net: MinorUnits) -> Self {
        match net {
            n if n > 0 => Standing::Creditor,
            n if n < 0 => Standing::Debtor,
            _ => Standing::Settled,
        }
    }
}

/// One member's line in a balance summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member: MemberId,
    pub payments: MinorUnits,
    pub debts: MinorUnits,
    pub net: MinorUnits,
    pub standing: Standing,
}

/// Overview of a group's outstanding balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Per-member positions in ledger order.
    pub balances: Vec<MemberBalance>,
    /// Total owed to net creditors.
    pub owed_to_creditors: MinorUnits,
    /// Total owed by net debtors, as a positive amount.
    pub owed_by_debtors: MinorUnits,
    /// Number of suggested payments.
    pub suggestion_count: usize,
    /// Sum of suggested payment amounts.
    pub suggested_volume: MinorUnits,
    pub suggestions: Vec<SuggestedSettlement>,
}

impl BalanceSummary {
    /// Summarise a settlement plan.
    ///
    /// A plan only exists for a balanced ledger, so both sides owe the
    /// plan's outstanding total.
    pub fn from_plan(plan: &SettlementPlan) -> Self {
        let balances = plan
            .ledger()
            .iter()
            .map(|(member, position)| {
                let net = position.settlements_needed();
                MemberBalance {
                    member: member.clone(),
                    payments: position.payments,
                    debts: position.debts,
                    net,
                    standing: Standing::from_net(net),
                }
            })
            .collect();

        BalanceSummary {
            balances,
            owed_to_creditors: plan.outstanding(),
            owed_by_debtors: plan.outstanding(),
            suggestion_count: plan.suggestions().len(),
            suggested_volume: plan.suggested_total(),
            suggestions: plan.suggestions().to_vec(),
        }
    }

    /// True when every member's net position is zero.
    pub fn is_settled(&self) -> bool {
        self.balances.iter().all(|b| b.standing == Standing::Settled)
    }

    pub fn balance_of(&self, member: &MemberId) -> Option<&MemberBalance> {
        self.balances.iter().find(|b| &b.member == member)
    }
}

impl std::fmt::Display for BalanceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Group Balance ===")?;
        writeln!(f, "Owed to creditors: {}", format_minor(self.owed_to_creditors))?;
        writeln!(f, "Owed by debtors:   {}", format_minor(self.owed_by_debtors))?;
        writeln!(f, "Suggested payments: {}", self.suggestion_count)?;

        writeln!(f, "\nMember Positions:")?;
        for balance in &self.balances {
            writeln!(
                f,
                "  {:<15} {:>12}  [{:?}]",
                balance.member.as_str(),
                format_minor(balance.net),
                balance.standing
            )?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f, "\nSuggested Settlements:")?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }
        Ok(())
    }
}
