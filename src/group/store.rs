//! Group snapshots and the storage contract the balance service reads from.
//!
//! Persistent storage lives outside this crate. [`GroupStore`] is the data
//! contract it must fulfil: hand back every member, shared expense and
//! settlement of a group from one consistent read.

use crate::core::amount::{checked_sum, MinorUnits};
use crate::core::expense::{ExpenseError, ExpenseSplit, SharedExpense};
use crate::core::member::{Member, MemberId};
use crate::core::settlement::Settlement;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised by a [`GroupStore`] or while reading a group file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("group {0} not found")]
    NotFound(GroupId),
    #[error("error reading '{path}': {message}")]
    Io { path: String, message: String },
    #[error("error parsing group file: {0}")]
    Parse(String),
    #[error("invalid expense '{description}'")]
    InvalidExpense {
        description: String,
        #[source]
        source: ExpenseError,
    },
}

/// Everything needed to balance one group, read in a single snapshot.
#[derive(Debug, Clone)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<Member>,
    pub expenses: Vec<SharedExpense>,
    pub settlements: Vec<Settlement>,
}

impl GroupSnapshot {
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            members,
            expenses: Vec::new(),
            settlements: Vec::new(),
        }
    }

    /// Every split of every shared expense, in expense order.
    pub fn splits(&self) -> Vec<ExpenseSplit> {
        self.expenses
            .iter()
            .flat_map(|e| e.splits().iter().cloned())
            .collect()
    }

    pub fn is_member(&self, member: &MemberId) -> bool {
        self.members.iter().any(|m| &m.id == member)
    }

    /// Total of all shared expenses, or `None` on overflow.
    pub fn expense_total(&self) -> Option<MinorUnits> {
        checked_sum(self.expenses.iter().map(|e| e.total()))
    }
}

/// Source of group snapshots.
pub trait GroupStore {
    fn load_snapshot(&self, group: &GroupId) -> Result<GroupSnapshot, StoreError>;
}

/// A [`GroupStore`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGroupStore {
    groups: HashMap<GroupId, GroupSnapshot>,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a group. Returns its ID.
    pub fn insert(&mut self, snapshot: GroupSnapshot) -> GroupId {
        let id = snapshot.id;
        self.groups.insert(id, snapshot);
        id
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl GroupStore for InMemoryGroupStore {
    fn load_snapshot(&self, group: &GroupId) -> Result<GroupSnapshot, StoreError> {
        self.groups
            .get(group)
            .cloned()
            .ok_or(StoreError::NotFound(*group))
    }
}

/// JSON schema for a split inside a group file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitInput {
    pub member: MemberId,
    #[serde(default)]
    pub paid: MinorUnits,
    #[serde(default)]
    pub owed: MinorUnits,
}

/// JSON schema for an expense inside a group file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub description: String,
    pub total: MinorUnits,
    pub date: NaiveDate,
    pub splits: Vec<SplitInput>,
}

/// JSON schema for a whole group file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupFile {
    #[serde(default)]
    pub id: Option<GroupId>,
    pub name: String,
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<ExpenseInput>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

impl GroupFile {
    /// Validate every expense and build a snapshot.
    pub fn into_snapshot(self) -> Result<GroupSnapshot, StoreError> {
        let expenses = self
            .expenses
            .into_iter()
            .map(|input| {
                let stakes = input
                    .splits
                    .into_iter()
                    .map(|s| (s.member, s.paid, s.owed))
                    .collect();
                SharedExpense::with_id(
                    input.id.unwrap_or_else(Uuid::new_v4),
                    input.description.clone(),
                    input.total,
                    input.date,
                    stakes,
                )
                .map_err(|source| StoreError::InvalidExpense {
                    description: input.description,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GroupSnapshot {
            id: self.id.unwrap_or_default(),
            name: self.name,
            members: self.members,
            expenses,
            settlements: self.settlements,
        })
    }

    pub fn from_snapshot(snapshot: &GroupSnapshot) -> Self {
        Self {
            id: Some(snapshot.id),
            name: snapshot.name.clone(),
            members: snapshot.members.clone(),
            expenses: snapshot
                .expenses
                .iter()
                .map(|e| ExpenseInput {
                    id: Some(e.id()),
                    description: e.description().to_string(),
                    total: e.total(),
                    date: e.date(),
                    splits: e
                        .splits()
                        .iter()
                        .map(|s| SplitInput {
                            member: s.member.clone(),
                            paid: s.paid,
                            owed: s.owed,
                        })
                        .collect(),
                })
                .collect(),
            settlements: snapshot.settlements.clone(),
        }
    }
}

/// Parse a group from JSON text.
pub fn parse_group(content: &str) -> Result<GroupSnapshot, StoreError> {
    let file: GroupFile =
        serde_json::from_str(content).map_err(|e| StoreError::Parse(e.to_string()))?;
    file.into_snapshot()
}

/// Read and parse a group file from disk.
pub fn load_group_file(path: impl AsRef<Path>) -> Result<GroupSnapshot, StoreError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_group(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP_JSON: &str = r#"{
        "name": "Weekend trip",
        "members": [
            { "id": "a", "first_name": "Ann" },
            { "id": "b", "first_name": "Ben", "last_name": "Hill", "avatar": "ben.png" }
        ],
        "expenses": [
            {
                "description": "Cabin",
                "total": 1000,
                "date": "2024-06-01",
                "splits": [
                    { "member": "a", "paid": 1000, "owed": 500 },
                    { "member": "b", "owed": 500 }
                ]
            }
        ],
        "settlements": [
            { "from": "b", "to": "a", "amount": 200, "date": "2024-06-03" }
        ]
    }"#;

    #[test]
    fn test_parse_group() {
        let snapshot = parse_group(GROUP_JSON).unwrap();
        assert_eq!(snapshot.name, "Weekend trip");
        assert_eq!(snapshot.members.len(), 2);
        assert_eq!(snapshot.splits().len(), 2);
        assert_eq!(snapshot.settlements.len(), 1);
        assert_eq!(snapshot.expense_total(), Some(1000));
        assert!(snapshot.is_member(&MemberId::new("b")));
    }

    #[test]
    fn test_invalid_expense_in_file() {
        let json = r#"{
            "name": "Broken",
            "members": [{ "id": "a", "first_name": "Ann" }],
            "expenses": [{
                "description": "Lunch",
                "total": 100,
                "date": "2024-06-01",
                "splits": [{ "member": "a", "paid": 90, "owed": 100 }]
            }]
        }"#;

        let err = parse_group(json).unwrap_err();
        assert!(matches!(err, StoreError::InvalidExpense { ref description, .. } if description == "Lunch"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_group("{"), Err(StoreError::Parse(_))));
    }

    #[test]
    fn test_in_memory_store() {
        let mut store = InMemoryGroupStore::new();
        let snapshot = parse_group(GROUP_JSON).unwrap();
        let id = store.insert(snapshot);

        assert_eq!(store.len(), 1);
        assert_eq!(store.load_snapshot(&id).unwrap().name, "Weekend trip");

        let missing = GroupId::new();
        assert!(matches!(store.load_snapshot(&missing), Err(StoreError::NotFound(g)) if g == missing));
    }

    #[test]
    fn test_file_round_trip_keeps_ids() {
        let snapshot = parse_group(GROUP_JSON).unwrap();
        let json = serde_json::to_string(&GroupFile::from_snapshot(&snapshot)).unwrap();
        let reloaded = parse_group(&json).unwrap();

        assert_eq!(reloaded.id, snapshot.id);
        assert_eq!(reloaded.expenses[0].id(), snapshot.expenses[0].id());
        assert_eq!(reloaded.settlements, snapshot.settlements);
    }
}
