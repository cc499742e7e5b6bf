use soroban_sdk::{contracttype, Address, Env};

use crate::{rewards, StakingError};

const DAY_IN_LEDGERS: u32 = 17_280; // ~5s ledgers

pub const POOL_TTL_EXTEND_TO: u32 = 7 * DAY_IN_LEDGERS;
const POOL_TTL_THRESHOLD: u32 = POOL_TTL_EXTEND_TO - DAY_IN_LEDGERS;

const ACCOUNT_TTL_EXTEND_TO: u32 = 30 * DAY_IN_LEDGERS;
const ACCOUNT_TTL_THRESHOLD: u32 = ACCOUNT_TTL_EXTEND_TO - DAY_IN_LEDGERS;

// ── Storage keys ────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug)]
pub enum DataKey {
    /// Singleton pool state, instance storage.
    Pool,
    /// Per-account record, persistent storage.
    Account(Address),
}

// ── Types ───────────────────────────────────────────────────────────────────

/// Everything the ledger knows about the pool as a whole.
///
/// Written once by `initialize` and afterwards only through
/// [`PoolState::checkpoint`] and the stake/withdraw balance updates.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    /// Token accepted as stake.
    pub staking_token: Address,
    /// Token paid out as reward. May equal `staking_token`.
    pub rewards_token: Address,
    /// Reward units emitted per second across all stakers.
    pub reward_rate: i128,
    /// Sum of every account's `balance`.
    pub total_staked: i128,
    /// Accumulated reward per staked unit, scaled by `PRECISION`.
    pub reward_per_token_stored: i128,
    /// Ledger timestamp of the last accumulator refresh.
    pub last_update_time: u64,
}

/// Per-account staking position.
///
/// An absent entry reads as the all-zero record; entries are never removed so
/// unclaimed reward survives a full withdrawal.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccountRecord {
    pub balance: i128,
    /// Value of `reward_per_token_stored` at this account's last checkpoint.
    pub reward_per_token_paid: i128,
    /// Reward settled to this account and not yet claimed.
    pub rewards_accrued: i128,
}

impl PoolState {
    pub fn new(
        staking_token: Address,
        rewards_token: Address,
        reward_rate: i128,
        now: u64,
    ) -> Self {
        Self {
            staking_token,
            rewards_token,
            reward_rate,
            total_staked: 0,
            reward_per_token_stored: 0,
            last_update_time: now,
        }
    }

    /// Accumulator value if the pool were checkpointed at `now`.
    pub fn current_reward_per_token(&self, now: u64) -> Result<i128, StakingError> {
        rewards::reward_per_token(
            self.reward_per_token_stored,
            self.reward_rate,
            now.saturating_sub(self.last_update_time),
            self.total_staked,
        )
    }

    /// Bring the accumulator up to `now`.
    ///
    /// `last_update_time` moves forward even when nothing is staked, which is
    /// what makes emission over an empty interval forfeit.
    pub fn checkpoint(&mut self, now: u64) -> Result<(), StakingError> {
        self.reward_per_token_stored = self.current_reward_per_token(now)?;
        self.last_update_time = now;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.total_staked == 0
    }
}

impl AccountRecord {
    /// Projected claimable reward against accumulator value `rpt`.
    pub fn earned(&self, rpt: i128) -> Result<i128, StakingError> {
        rewards::earned(
            self.balance,
            rpt,
            self.reward_per_token_paid,
            self.rewards_accrued,
        )
    }

    /// Settle everything owed up to `rpt` into `rewards_accrued` and move the
    /// snapshot forward.
    pub fn settle(&mut self, rpt: i128) -> Result<(), StakingError> {
        self.rewards_accrued = self.earned(rpt)?;
        self.reward_per_token_paid = rpt;
        Ok(())
    }
}

// ── Storage helpers ─────────────────────────────────────────────────────────

pub fn has_pool(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Pool)
}

fn extend_pool_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(POOL_TTL_THRESHOLD, POOL_TTL_EXTEND_TO);
}

/// Read the pool state. Reads keep the instance alive just like writes, so a
/// pool that is only queried is not archived.
pub fn load_pool(env: &Env) -> Result<PoolState, StakingError> {
    let pool: PoolState = env
        .storage()
        .instance()
        .get(&DataKey::Pool)
        .ok_or(StakingError::NotInitialized)?;
    extend_pool_ttl(env);
    Ok(pool)
}

pub fn save_pool(env: &Env, pool: &PoolState) {
    env.storage().instance().set(&DataKey::Pool, pool);
    extend_pool_ttl(env);
}

fn extend_account_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, ACCOUNT_TTL_THRESHOLD, ACCOUNT_TTL_EXTEND_TO);
}

/// Read an account record, defaulting to zero for accounts never seen.
pub fn load_account(env: &Env, account: &Address) -> AccountRecord {
    let key = DataKey::Account(account.clone());
    match env.storage().persistent().get(&key) {
        Some(record) => {
            extend_account_ttl(env, &key);
            record
        }
        None => AccountRecord::default(),
    }
}

pub fn save_account(env: &Env, account: &Address, record: &AccountRecord) {
    let key = DataKey::Account(account.clone());
    env.storage().persistent().set(&key, record);
    extend_account_ttl(env, &key);
}
