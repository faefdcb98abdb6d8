use crate::core::amount::MinorUnits;
use crate::core::member::{Member, MemberId};
use crate::group::store::{GroupId, GroupSnapshot, GroupStore, StoreError};
use crate::optimization::settlement::{BalanceError, SettlementEngine, SettlementPlan};
use crate::optimization::summary::BalanceSummary;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by [`GroupBalanceService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("group {0} not found")]
    NotFound(GroupId),
    #[error("member {requester} does not belong to group {group}")]
    Forbidden { group: GroupId, requester: MemberId },
    #[error(transparent)]
    Storage(StoreError),
    #[error(transparent)]
    Balance(#[from] BalanceError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(group) => ServiceError::NotFound(group),
            other => ServiceError::Storage(other),
        }
    }
}

impl ServiceError {
    /// Message safe to show to the requesting user.
    ///
    /// Never includes member or expense identifiers.
    pub fn user_message(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "group not found",
            ServiceError::Forbidden { .. } => "you are not a member of this group",
            ServiceError::Storage(_) => "could not load group",
            ServiceError::Balance(_) => "could not compute balance",
        }
    }
}

/// Member display data returned alongside suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    pub id: MemberId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

impl From<&Member> for MemberView {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            avatar: member.avatar.clone(),
        }
    }
}

/// A suggested payment resolved to member display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementView {
    pub from: MemberView,
    pub to: MemberView,
    pub amount: MinorUnits,
}

/// Answers balance queries for a group on behalf of one of its members.
///
/// The requester is always passed in explicitly. The service checks that
/// they belong to the group before any balance is computed.
pub struct GroupBalanceService<S: GroupStore> {
    store: S,
}

impl<S: GroupStore> GroupBalanceService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Suggested settlements for the group, resolved to member display data.
    pub fn suggested_settlements(
        &self,
        requester: &MemberId,
        group: &GroupId,
    ) -> Result<Vec<SettlementView>, ServiceError> {
        let plan = self.plan(requester, group)?;
        let views: Vec<SettlementView> = plan
            .suggestions()
            .iter()
            .map(|s| SettlementView {
                from: MemberView::from(&s.from),
                to: MemberView::from(&s.to),
                amount: s.amount,
            })
            .collect();

        info!("Group {}: {} suggested settlements", group, views.len());
        Ok(views)
    }

    /// Per-member balances and suggestions for the group.
    pub fn balance_summary(
        &self,
        requester: &MemberId,
        group: &GroupId,
    ) -> Result<BalanceSummary, ServiceError> {
        let plan = self.plan(requester, group)?;
        Ok(BalanceSummary::from_plan(&plan))
    }

    fn plan(&self, requester: &MemberId, group: &GroupId) -> Result<SettlementPlan, ServiceError> {
        let snapshot = self.authorized_snapshot(requester, group)?;
        let splits = snapshot.splits();
        debug!(
            "Balancing group {}: {} members, {} splits, {} settlements",
            group,
            snapshot.members.len(),
            splits.len(),
            snapshot.settlements.len()
        );

        SettlementEngine::plan(&snapshot.members, &splits, &snapshot.settlements).map_err(|e| {
            error!("Could not compute balance for group {}: {}", group, e);
            ServiceError::Balance(e)
        })
    }

    fn authorized_snapshot(
        &self,
        requester: &MemberId,
        group: &GroupId,
    ) -> Result<GroupSnapshot, ServiceError> {
        let snapshot = self.store.load_snapshot(group)?;
        if !snapshot.is_member(requester) {
            warn!("Rejected balance request for group {} from non-member", group);
            return Err(ServiceError::Forbidden {
                group: *group,
                requester: requester.clone(),
            });
        }
        Ok(snapshot)
    }
}
