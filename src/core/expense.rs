use crate::core::amount::{checked_sum, MinorUnits};
use crate::core::member::MemberId;
use crate::optimization::split::{split_equally, SplitError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// One member's stake in a shared expense.
///
/// `paid` is what the member put in, `owed` is their share of the cost.
/// Both are non-negative minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub expense_id: Uuid,
    pub member: MemberId,
    pub paid: MinorUnits,
    pub owed: MinorUnits,
}

impl ExpenseSplit {
    pub fn new(expense_id: Uuid, member: MemberId, paid: MinorUnits, owed: MinorUnits) -> Self {
        Self {
            expense_id,
            member,
            paid,
            owed,
        }
    }

    /// `paid - owed` for this split alone.
    pub fn net(&self) -> MinorUnits {
        self.paid - self.owed
    }
}

/// Errors raised when creating a shared expense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseError {
    #[error("expense total must be positive, got {0}")]
    NonPositiveTotal(MinorUnits),
    #[error("split for {member} has negative {field}: {amount}")]
    NegativeSplit {
        member: MemberId,
        field: &'static str,
        amount: MinorUnits,
    },
    #[error("member {0} appears in more than one split")]
    DuplicateMember(MemberId),
    #[error("sum of {field} is {actual}, expected expense total {expected}")]
    TotalMismatch {
        field: &'static str,
        expected: MinorUnits,
        actual: MinorUnits,
    },
    #[error("amount overflow while summing splits")]
    Overflow,
    #[error(transparent)]
    Split(#[from] SplitError),
}

/// An expense attributed to a group and split across its members.
///
/// Created through [`SharedExpense::new`], which enforces that the paid and
/// owed columns each sum to the expense total. Records loaded from storage
/// are deserialized directly and trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedExpense {
    id: Uuid,
    description: String,
    total: MinorUnits,
    date: NaiveDate,
    splits: Vec<ExpenseSplit>,
}

impl SharedExpense {
    /// Create a validated shared expense.
    ///
    /// `stakes` holds `(member, paid, owed)` per participating member.
    pub fn new(
        description: impl Into<String>,
        total: MinorUnits,
        date: NaiveDate,
        stakes: Vec<(MemberId, MinorUnits, MinorUnits)>,
    ) -> Result<Self, ExpenseError> {
        Self::with_id(Uuid::new_v4(), description, total, date, stakes)
    }

    /// Create a validated shared expense with a specific ID.
    pub fn with_id(
        id: Uuid,
        description: impl Into<String>,
        total: MinorUnits,
        date: NaiveDate,
        stakes: Vec<(MemberId, MinorUnits, MinorUnits)>,
    ) -> Result<Self, ExpenseError> {
        if total <= 0 {
            return Err(ExpenseError::NonPositiveTotal(total));
        }

        let mut seen = HashSet::new();
        for (member, paid, owed) in &stakes {
            if *paid < 0 {
                return Err(ExpenseError::NegativeSplit {
                    member: member.clone(),
                    field: "paid",
                    amount: *paid,
                });
            }
            if *owed < 0 {
                return Err(ExpenseError::NegativeSplit {
                    member: member.clone(),
                    field: "owed",
                    amount: *owed,
                });
            }
            if !seen.insert(member.clone()) {
                return Err(ExpenseError::DuplicateMember(member.clone()));
            }
        }

        let paid_sum = checked_sum(stakes.iter().map(|(_, p, _)| *p)).ok_or(ExpenseError::Overflow)?;
        if paid_sum != total {
            return Err(ExpenseError::TotalMismatch {
                field: "paid",
                expected: total,
                actual: paid_sum,
            });
        }
        let owed_sum = checked_sum(stakes.iter().map(|(_, _, o)| *o)).ok_or(ExpenseError::Overflow)?;
        if owed_sum != total {
            return Err(ExpenseError::TotalMismatch {
                field: "owed",
                expected: total,
                actual: owed_sum,
            });
        }

        let splits = stakes
            .into_iter()
            .map(|(member, paid, owed)| ExpenseSplit::new(id, member, paid, owed))
            .collect();

        Ok(Self {
            id,
            description: description.into(),
            total,
            date,
            splits,
        })
    }

    /// An expense paid in full by `payer` and owed equally by `participants`.
    ///
    /// Leftover minor units go one at a time to participants in order.
    /// The payer need not be a participant.
    pub fn split_equally(
        description: impl Into<String>,
        total: MinorUnits,
        date: NaiveDate,
        payer: &MemberId,
        participants: &[MemberId],
    ) -> Result<Self, ExpenseError> {
        let shares = split_equally(total, participants.len())?;

        let mut stakes: Vec<(MemberId, MinorUnits, MinorUnits)> = participants
            .iter()
            .cloned()
            .zip(shares)
            .map(|(member, owed)| {
                let paid = if &member == payer { total } else { 0 };
                (member, paid, owed)
            })
            .collect();

        if !participants.contains(payer) {
            stakes.push((payer.clone(), total, 0));
        }

        Self::new(description, total, date, stakes)
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn total(&self) -> MinorUnits {
        self.total
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn splits(&self) -> &[ExpenseSplit] {
        &self.splits
    }
}
