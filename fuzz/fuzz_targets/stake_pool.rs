#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token::{StellarAssetClient, TokenClient},
    Address, Env,
};
use stake_pool::{StakePoolContract, StakePoolContractClient, DEFAULT_REWARD_RATE};

const STAKERS: usize = 4;
const WALLET: i128 = 1_000_000_000_000_000_000_000_000;

#[derive(Arbitrary, Debug)]
enum Op {
    Stake { who: u8, amount: u64 },
    Withdraw { who: u8, amount: u64 },
    Claim { who: u8 },
    Wait { seconds: u32 },
}

#[derive(Arbitrary, Debug)]
struct Input {
    reward_rate: u16,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let env = Env::default();
    env.mock_all_auths();

    let stake_sac = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let reward_sac = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let stake_admin = StellarAssetClient::new(&env, &stake_sac.address());
    let reward_admin = StellarAssetClient::new(&env, &reward_sac.address());
    let stake_token = TokenClient::new(&env, &stake_sac.address());

    let id = env.register(StakePoolContract, ());
    let client = StakePoolContractClient::new(&env, &id);
    let rate = i128::from(input.reward_rate).max(DEFAULT_REWARD_RATE);
    client.initialize(&stake_sac.address(), &reward_sac.address(), &rate);
    reward_admin.mint(&id, &WALLET);

    let stakers: Vec<Address> = (0..STAKERS)
        .map(|_| {
            let user = Address::generate(&env);
            stake_admin.mint(&user, &WALLET);
            user
        })
        .collect();

    let mut last_rpt = 0i128;
    for op in input.ops.iter().take(64) {
        match *op {
            Op::Stake { who, amount } => {
                let staker = &stakers[who as usize % STAKERS];
                let _ = client.try_stake_tokens(staker, &i128::from(amount));
            }
            Op::Withdraw { who, amount } => {
                let staker = &stakers[who as usize % STAKERS];
                let _ = client.try_withdraw_tokens(staker, &i128::from(amount));
            }
            Op::Claim { who } => {
                let staker = &stakers[who as usize % STAKERS];
                let _ = client.try_claim_reward(staker);
            }
            Op::Wait { seconds } => {
                env.ledger()
                    .with_mut(|li| li.timestamp = li.timestamp.saturating_add(u64::from(seconds)));
            }
        }

        let total = client.total_staked();
        let sum: i128 = stakers.iter().map(|s| client.get_staked(s)).sum();
        assert_eq!(sum, total, "per-account balances must add up to the pool total");
        assert_eq!(stake_token.balance(&id), total, "custody must match the pool total");

        let rpt = client.reward_per_token_stored();
        assert!(rpt >= last_rpt, "accumulator went backwards");
        last_rpt = rpt;
    }
});
