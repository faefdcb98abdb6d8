use crate::core::amount::MinorUnits;
use crate::core::member::MemberId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when recording a new settlement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementRecordError {
    #[error("settlement amount must be positive, got {0}")]
    NonPositiveAmount(MinorUnits),
    #[error("member {0} cannot settle with themselves")]
    SelfSettlement(MemberId),
}

/// A direct payment from one group member to another.
///
/// `from` paid `to` the given `amount` on `date`. Settlements reduce the
/// outstanding imbalance between the two members.
///
/// # Examples
///
/// ```
/// use balance_engine::core::member::MemberId;
/// use balance_engine::core::settlement::Settlement;
/// use chrono::NaiveDate;
///
/// let settlement = Settlement::record(
///     MemberId::new("bob"),
///     MemberId::new("alice"),
///     500,
///     NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(settlement.amount(), 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    from: MemberId,
    to: MemberId,
    amount: MinorUnits,
    date: NaiveDate,
}

impl Settlement {
    /// Record a new settlement, validating the write-path invariants.
    pub fn record(
        from: MemberId,
        to: MemberId,
        amount: MinorUnits,
        date: NaiveDate,
    ) -> Result<Self, SettlementRecordError> {
        if amount <= 0 {
            return Err(SettlementRecordError::NonPositiveAmount(amount));
        }
        if from == to {
            return Err(SettlementRecordError::SelfSettlement(from));
        }
        Ok(Self::from_parts(Uuid::new_v4(), from, to, amount, date))
    }

    /// Rebuild a settlement from persisted history without validation.
    pub fn from_parts(
        id: Uuid,
        from: MemberId,
        to: MemberId,
        amount: MinorUnits,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            from,
            to,
            amount,
            date,
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn from(&self) -> &MemberId {
        &self.from
    }

    pub fn to(&self) -> &MemberId {
        &self.to
    }

    pub fn amount(&self) -> MinorUnits {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_record_settlement() {
        let s = Settlement::record(MemberId::new("b"), MemberId::new("a"), 250, date()).unwrap();
        assert_eq!(s.from().as_str(), "b");
        assert_eq!(s.to().as_str(), "a");
        assert_eq!(s.amount(), 250);
        assert_eq!(s.date(), date());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let err = Settlement::record(MemberId::new("b"), MemberId::new("a"), 0, date()).unwrap_err();
        assert_eq!(err, SettlementRecordError::NonPositiveAmount(0));
    }

    #[test]
    fn test_self_settlement_rejected() {
        let err = Settlement::record(MemberId::new("a"), MemberId::new("a"), 10, date()).unwrap_err();
        assert_eq!(err, SettlementRecordError::SelfSettlement(MemberId::new("a")));
    }

    #[test]
    fn test_deserialize_without_id() {
        let s: Settlement =
            serde_json::from_str(r#"{"from":"b","to":"a","amount":500,"date":"2024-01-15"}"#)
                .unwrap();
        assert_eq!(s.amount(), 500);
        assert_eq!(s.date(), date());
    }
}
