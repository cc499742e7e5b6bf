#![no_std]

pub mod events;
pub mod rewards;
pub mod storage;

use soroban_sdk::{contract, contractimpl, log, token, Address, Env};

pub use rewards::{DEFAULT_REWARD_RATE, PRECISION};
pub use storage::{AccountRecord, PoolState};

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum StakingError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    InvalidAmount = 3,
    InsufficientStake = 4,
    TransferFailed = 5,
    Overflow = 6,
    InvalidRewardRate = 7,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakePoolContract;

#[contractimpl]
impl StakePoolContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Create the pool.
    ///
    /// * `staking_token` – token users deposit.
    /// * `rewards_token` – token paid out as reward; may be the same token.
    /// * `reward_rate`   – reward units emitted **per second** across all
    ///   stakers. Fixed for the lifetime of the pool.
    pub fn initialize(
        env: Env,
        staking_token: Address,
        rewards_token: Address,
        reward_rate: i128,
    ) -> Result<(), StakingError> {
        if storage::has_pool(&env) {
            return Err(StakingError::AlreadyInitialized);
        }
        if reward_rate < 0 {
            return Err(StakingError::InvalidRewardRate);
        }

        let pool = PoolState::new(
            staking_token.clone(),
            rewards_token.clone(),
            reward_rate,
            env.ledger().timestamp(),
        );
        storage::save_pool(&env, &pool);

        events::publish_initialized(&env, staking_token, rewards_token, reward_rate);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens from `staker` into the pool.
    ///
    /// The accumulator is checkpointed before the balance changes so the new
    /// deposit earns nothing for time that has already passed. Nothing is
    /// written until the token pull has succeeded.
    pub fn stake_tokens(env: Env, staker: Address, amount: i128) -> Result<(), StakingError> {
        let mut pool = storage::load_pool(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(StakingError::InvalidAmount);
        }

        let mut account = storage::load_account(&env, &staker);
        Self::checkpoint(&env, &mut pool, &mut account)?;

        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        pool.total_staked = pool
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;

        Self::transfer(
            &env,
            &pool.staking_token,
            &staker,
            &env.current_contract_address(),
            amount,
        )?;

        storage::save_account(&env, &staker, &account);
        storage::save_pool(&env, &pool);

        events::publish_staked(&env, staker, amount, pool.total_staked);

        Ok(())
    }

    /// Return `amount` stake tokens from the pool to `staker`.
    ///
    /// Balances are debited and committed before the outbound transfer
    /// (checks-effects-interactions).
    pub fn withdraw_tokens(env: Env, staker: Address, amount: i128) -> Result<(), StakingError> {
        let mut pool = storage::load_pool(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(StakingError::InvalidAmount);
        }

        let mut account = storage::load_account(&env, &staker);
        if amount > account.balance {
            return Err(StakingError::InsufficientStake);
        }

        Self::checkpoint(&env, &mut pool, &mut account)?;

        account.balance = account
            .balance
            .checked_sub(amount)
            .ok_or(StakingError::Overflow)?;
        pool.total_staked = pool
            .total_staked
            .checked_sub(amount)
            .ok_or(StakingError::Overflow)?;

        storage::save_account(&env, &staker, &account);
        storage::save_pool(&env, &pool);

        Self::transfer(
            &env,
            &pool.staking_token,
            &env.current_contract_address(),
            &staker,
            amount,
        )?;

        events::publish_withdrawn(&env, staker, amount, pool.total_staked);

        Ok(())
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay out everything `staker` has earned so far and return the amount.
    ///
    /// Claiming with nothing owed succeeds and returns 0 without touching the
    /// rewards token. The pool must hold enough of the rewards token; if it
    /// does not the claim fails with `TransferFailed`.
    pub fn claim_reward(env: Env, staker: Address) -> Result<i128, StakingError> {
        let mut pool = storage::load_pool(&env)?;
        staker.require_auth();

        let mut account = storage::load_account(&env, &staker);
        Self::checkpoint(&env, &mut pool, &mut account)?;

        let reward = account.rewards_accrued;
        account.rewards_accrued = 0;

        storage::save_account(&env, &staker, &account);
        storage::save_pool(&env, &pool);

        if reward == 0 {
            return Ok(0);
        }

        Self::transfer(
            &env,
            &pool.rewards_token,
            &env.current_contract_address(),
            &staker,
            reward,
        )?;

        events::publish_reward_paid(&env, staker, reward);

        Ok(reward)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Accumulator value as of the current ledger timestamp, without
    /// writing it back.
    pub fn reward_per_token(env: Env) -> Result<i128, StakingError> {
        storage::load_pool(&env)?.current_reward_per_token(env.ledger().timestamp())
    }

    /// Reward `account` could claim right now.
    pub fn earned(env: Env, account: Address) -> Result<i128, StakingError> {
        let rpt = Self::reward_per_token(env.clone())?;
        storage::load_account(&env, &account).earned(rpt)
    }

    /// Amount currently staked by `account`.
    pub fn get_staked(env: Env, account: Address) -> i128 {
        storage::load_account(&env, &account).balance
    }

    /// Stored position of `account` as of its last checkpoint.
    pub fn get_account(env: Env, account: Address) -> AccountRecord {
        storage::load_account(&env, &account)
    }

    pub fn staking_token(env: Env) -> Result<Address, StakingError> {
        Ok(storage::load_pool(&env)?.staking_token)
    }

    pub fn rewards_token(env: Env) -> Result<Address, StakingError> {
        Ok(storage::load_pool(&env)?.rewards_token)
    }

    pub fn reward_rate(env: Env) -> Result<i128, StakingError> {
        Ok(storage::load_pool(&env)?.reward_rate)
    }

    pub fn total_staked(env: Env) -> Result<i128, StakingError> {
        Ok(storage::load_pool(&env)?.total_staked)
    }

    /// Accumulator value as of the last checkpoint.
    pub fn reward_per_token_stored(env: Env) -> Result<i128, StakingError> {
        Ok(storage::load_pool(&env)?.reward_per_token_stored)
    }

    pub fn last_update_time(env: Env) -> Result<u64, StakingError> {
        Ok(storage::load_pool(&env)?.last_update_time)
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::has_pool(&env)
    }

    pub fn version() -> u32 {
        1
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Accrual checkpoint: bring the pool accumulator up to now, then settle
    /// `account` against it. Must run before any balance change.
    fn checkpoint(
        env: &Env,
        pool: &mut PoolState,
        account: &mut AccountRecord,
    ) -> Result<(), StakingError> {
        let now = env.ledger().timestamp();
        if pool.is_empty() && now > pool.last_update_time {
            log!(env, "pool empty, emission forfeited", now - pool.last_update_time);
        }

        pool.checkpoint(now)?;
        account.settle(pool.reward_per_token_stored)
    }

    fn transfer(
        env: &Env,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), StakingError> {
        match token::Client::new(env, token).try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(StakingError::TransferFailed),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
