use soroban_sdk::{contracttype, symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub staking_token: Address,
    pub rewards_token: Address,
    pub reward_rate: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub amount: i128,
    /// Pool total after the deposit.
    pub total_staked: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub staker: Address,
    pub amount: i128,
    /// Pool total after the withdrawal.
    pub total_staked: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPaidEvent {
    pub staker: Address,
    pub amount: i128,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    staking_token: Address,
    rewards_token: Address,
    reward_rate: i128,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            staking_token,
            rewards_token,
            reward_rate,
        },
    );
}

pub fn publish_staked(env: &Env, staker: Address, amount: i128, total_staked: i128) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            amount,
            total_staked,
        },
    );
}

pub fn publish_withdrawn(env: &Env, staker: Address, amount: i128, total_staked: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), staker.clone()),
        WithdrawnEvent {
            staker,
            amount,
            total_staked,
        },
    );
}

pub fn publish_reward_paid(env: &Env, staker: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RWD_PAID"), staker.clone()),
        RewardPaidEvent { staker, amount },
    );
}
