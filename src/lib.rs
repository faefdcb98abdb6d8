//! # balance-engine
//!
//! Group expense balancing and settlement suggestions.
//!
//! Given a group's shared expenses (who paid what, who owed what) and the
//! direct settlements already recorded between members, this engine computes
//! each member's net position and a set of suggested payments that brings
//! every position back to zero.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: members, expenses, settlements, ledger
//! - **optimization** — Settlement matching, expense splitting, summaries
//! - **group** — Group snapshots, storage contract, balance retrieval service
//! - **simulation** — Random group generation for benchmarks

pub mod core;
pub mod group;
pub mod optimization;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::expense::{ExpenseSplit, SharedExpense};
    pub use crate::core::ledger::{Ledger, NetPosition};
    pub use crate::core::member::{Member, MemberId};
    pub use crate::core::settlement::Settlement;
    pub use crate::group::service::{GroupBalanceService, ServiceError, SettlementView};
    pub use crate::group::store::{GroupId, GroupSnapshot, GroupStore, InMemoryGroupStore};
    pub use crate::optimization::settlement::{
        BalanceError, SettlementEngine, SettlementPlan, SuggestedSettlement,
    };
    pub use crate::optimization::summary::BalanceSummary;
}
