use crate::StakingError;

/// Fixed-point scaling factor.
///
/// Reward-per-token values are stored multiplied by this constant so that the
/// fractional reward owed per staked unit survives integer division. 10^18
/// matches the 18-decimal token amounts the pool was first deployed against.
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

/// Reward units emitted per second by the first deployment of the pool.
///
/// With 1 000 tokens of 18 decimals staked for one day this advances the
/// accumulator by exactly `8_640`.
pub const DEFAULT_REWARD_RATE: i128 = 100;

// ── Core reward engine ──────────────────────────────────────────────────────

/// Project the global reward-per-token accumulator forward by `elapsed`
/// seconds.
///
/// ```text
/// Δrpt    = reward_rate × elapsed × PRECISION / total_staked
/// new_rpt = stored + Δrpt
/// ```
///
/// An empty pool leaves `stored` untouched: emission over an interval with
/// nobody staked is forfeit and never handed to a later staker.
///
/// Division truncates toward zero, so the pool never pays out more than it
/// emitted. Any intermediate overflow is reported as `Overflow`.
pub fn reward_per_token(
    stored: i128,
    reward_rate: i128,
    elapsed: u64,
    total_staked: i128,
) -> Result<i128, StakingError> {
    if total_staked <= 0 {
        return Ok(stored);
    }

    let emitted = reward_rate
        .checked_mul(i128::from(elapsed))
        .and_then(|v| v.checked_mul(PRECISION))
        .ok_or(StakingError::Overflow)?;

    stored
        .checked_add(emitted / total_staked)
        .ok_or(StakingError::Overflow)
}

/// Total reward owed to one account.
///
/// ```text
/// earned = accrued + balance × (current_rpt − rpt_paid) / PRECISION
/// ```
///
/// `current_rpt − rpt_paid` is the accumulation since the account's last
/// checkpoint, so reward settled into `accrued` earlier is never counted
/// twice.
pub fn earned(
    balance: i128,
    current_rpt: i128,
    rpt_paid: i128,
    accrued: i128,
) -> Result<i128, StakingError> {
    let pending = current_rpt
        .checked_sub(rpt_paid)
        .and_then(|delta| balance.checked_mul(delta))
        .ok_or(StakingError::Overflow)?
        / PRECISION;

    accrued.checked_add(pending).ok_or(StakingError::Overflow)
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure math, no Soroban environment.

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    const TOKEN: i128 = 1_000_000_000_000_000_000;
    const DAY: u64 = 86_400;

    #[test]
    fn rpt_unchanged_when_pool_empty() {
        let rpt = reward_per_token(500, 100, 60, 0).unwrap();
        assert_eq!(rpt, 500, "empty pool must not advance the accumulator");
    }

    #[test]
    fn rpt_reaches_one_reward_per_staked_unit() {
        // 100/s for 10s spread over 1_000 staked units.
        let rpt = reward_per_token(0, DEFAULT_REWARD_RATE, 10, 1_000).unwrap();
        assert_eq!(rpt, PRECISION);
    }

    #[test]
    fn rpt_one_day_of_default_rate() {
        let rpt = reward_per_token(0, DEFAULT_REWARD_RATE, DAY, 1_000 * TOKEN).unwrap();
        assert_eq!(rpt, 8_640);
    }

    #[test]
    fn rpt_builds_on_stored_value() {
        let first = reward_per_token(0, DEFAULT_REWARD_RATE, DAY, 1_000 * TOKEN).unwrap();
        let second = reward_per_token(first, DEFAULT_REWARD_RATE, DAY, 1_000 * TOKEN).unwrap();
        assert_eq!(second, 17_280);
    }

    #[test]
    fn rpt_truncates_toward_zero() {
        // 1 × 1 × 10^18 / (3 × 10^18) < 1
        let rpt = reward_per_token(7, 1, 1, 3 * TOKEN).unwrap();
        assert_eq!(rpt, 7);
    }

    #[test]
    fn rpt_overflow_is_an_error() {
        assert_eq!(
            reward_per_token(0, i128::MAX, 2, 1),
            Err(StakingError::Overflow)
        );
        assert_eq!(
            reward_per_token(i128::MAX, 1, 1, 1),
            Err(StakingError::Overflow)
        );
    }

    #[test]
    fn earned_is_settled_reward_when_snapshot_is_current() {
        // Checkpointed after one day: nothing new beyond what was settled.
        let e = earned(1_000 * TOKEN, 8_640, 8_640, 8_640_000).unwrap();
        assert_eq!(e, 8_640_000);
    }

    #[test]
    fn earned_proportional_to_stake() {
        assert_eq!(earned(1_000, PRECISION, 0, 0).unwrap(), 1_000);
        assert_eq!(earned(2_000, PRECISION, 0, 0).unwrap(), 2_000);
    }

    #[test]
    fn earned_one_day_of_default_rate() {
        assert_eq!(earned(1_000 * TOKEN, 8_640, 0, 0).unwrap(), 8_640_000);
    }

    #[test]
    fn earned_truncates_toward_zero() {
        assert_eq!(earned(1, PRECISION - 1, 0, 0).unwrap(), 0);
    }

    #[test]
    fn earned_overflow_is_an_error() {
        assert_eq!(earned(i128::MAX, 2, 0, 0), Err(StakingError::Overflow));
        assert_eq!(
            earned(PRECISION, PRECISION, 0, i128::MAX),
            Err(StakingError::Overflow)
        );
    }
}
