//! Helpers for dividing an expense total among members.
//!
//! Integer division leaves a remainder. It is handed out one minor unit at a
//! time to successive members, starting with the first, so the shares always
//! sum to the total exactly.

use crate::core::amount::MinorUnits;
use thiserror::Error;

/// Errors arising from splitting a total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("cannot split among zero participants")]
    NoParticipants,
    #[error("cannot split a negative total: {0}")]
    NegativeTotal(MinorUnits),
    #[error("weights must not all be zero")]
    ZeroWeights,
}

/// Split `total` into `participants` near-equal shares.
///
/// # Examples
///
/// ```
/// use balance_engine::optimization::split::split_equally;
///
/// assert_eq!(split_equally(1000, 3).unwrap(), vec![334, 333, 333]);
/// assert_eq!(split_equally(900, 3).unwrap(), vec![300, 300, 300]);
/// ```
pub fn split_equally(total: MinorUnits, participants: usize) -> Result<Vec<MinorUnits>, SplitError> {
    if participants == 0 {
        return Err(SplitError::NoParticipants);
    }
    split_by_weights(total, &vec![1; participants])
}

/// Split `total` in proportion to integer `weights`.
///
/// Each share is floored, then the leftover units go round-robin from the
/// first member with a non-zero weight onward.
///
/// # Examples
///
/// ```
/// use balance_engine::optimization::split::split_by_weights;
///
/// // 1/3, 1/6, 1/8 and 3/8 of the total
/// let shares = split_by_weights(2400, &[8, 4, 3, 9]).unwrap();
/// assert_eq!(shares, vec![800, 400, 300, 900]);
/// ```
pub fn split_by_weights(total: MinorUnits, weights: &[u32]) -> Result<Vec<MinorUnits>, SplitError> {
    if weights.is_empty() {
        return Err(SplitError::NoParticipants);
    }
    if total < 0 {
        return Err(SplitError::NegativeTotal(total));
    }
    let weight_sum: i128 = weights.iter().map(|w| i128::from(*w)).sum();
    if weight_sum == 0 {
        return Err(SplitError::ZeroWeights);
    }

    // total * weight fits in i128 for any i64 total and u32 weight
    let mut shares: Vec<MinorUnits> = weights
        .iter()
        .map(|w| (i128::from(total) * i128::from(*w) / weight_sum) as MinorUnits)
        .collect();

    let allocated: MinorUnits = shares.iter().sum();
    let mut remainder = total - allocated;

    // zero-weight members never receive leftover units
    let eligible: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0).collect();
    for &slot in eligible.iter().cycle() {
        if remainder == 0 {
            break;
        }
        shares[slot] += 1;
        remainder -= 1;
    }

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        assert_eq!(split_equally(900, 3).unwrap(), vec![300, 300, 300]);
    }

    #[test]
    fn test_remainder_round_robin() {
        assert_eq!(split_equally(1001, 4).unwrap(), vec![251, 250, 250, 250]);
        assert_eq!(split_equally(1003, 4).unwrap(), vec![251, 251, 251, 250]);
    }

    #[test]
    fn test_total_smaller_than_participants() {
        assert_eq!(split_equally(2, 5).unwrap(), vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_zero_participants() {
        assert_eq!(split_equally(100, 0), Err(SplitError::NoParticipants));
    }

    #[test]
    fn test_negative_total() {
        assert_eq!(split_equally(-1, 2), Err(SplitError::NegativeTotal(-1)));
    }

    #[test]
    fn test_weighted_reference_proportions() {
        let shares = split_by_weights(1000, &[8, 4, 3, 9]).unwrap();
        assert_eq!(shares, vec![334, 166, 125, 375]);
        assert_eq!(shares.iter().sum::<i64>(), 1000);
    }

    #[test]
    fn test_weighted_zero_weight_member() {
        let shares = split_by_weights(100, &[1, 0, 1]).unwrap();
        assert_eq!(shares, vec![50, 0, 50]);

        let shares = split_by_weights(1, &[0, 1, 1]).unwrap();
        assert_eq!(shares, vec![0, 1, 0]);
    }

    #[test]
    fn test_all_zero_weights() {
        assert_eq!(split_by_weights(100, &[0, 0]), Err(SplitError::ZeroWeights));
    }

    #[test]
    fn test_large_total_exact() {
        let shares = split_by_weights(i64::MAX, &[u32::MAX, 1, 7]).unwrap();
        assert_eq!(shares.iter().map(|s| i128::from(*s)).sum::<i128>(), i128::from(i64::MAX));
    }
}
