//! # Mock Price Feed
//!
//! A settable price oracle for local networks and tests. It answers the same
//! `decimals` / `latest_round_data` queries as a production feed, so FundMe
//! can be deployed against it unchanged.
//!
//! Rounds are numbered from 1. Every `update_answer` opens a new round
//! stamped with the current ledger timestamp; `update_round_data` writes an
//! explicit round and makes it the latest.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, panic_with_error, Env, String,
};


/// Largest supported `decimals()`; keeps `10^decimals` within `i128`.
const MAX_DECIMALS: u32 = 18;

const DAY_IN_LEDGERS: u32 = 17_280;
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    RoundNotFound   = 1,
    InvalidDecimals = 2,
}

/// One price round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundData {
    pub round_id: u64,
    pub answer: i128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum DataKey {
    Decimals,
    LatestRound,
    Round(u64),
}

#[contract]
pub struct MockPriceFeed;

#[contractimpl]
impl MockPriceFeed {
    pub fn __constructor(env: Env, decimals: u32, initial_answer: i128) {
        if decimals > MAX_DECIMALS {
            panic_with_error!(&env, Error::InvalidDecimals);
        }
        env.storage().instance().set(&DataKey::Decimals, &decimals);
        Self::update_answer(env, initial_answer);
    }

    pub fn decimals(env: Env) -> u32 {
        bump(&env);
        env.storage()
            .instance()
            .get(&DataKey::Decimals)
            .unwrap_or(0)
    }

    pub fn version(_env: Env) -> u32 {
        0
    }

    pub fn description(env: Env) -> String {
        String::from_str(&env, "mock XLM / USD")
    }

    /// Open a new round carrying `answer`.
    pub fn update_answer(env: Env, answer: i128) {
        let round_id = latest_round_id(&env) + 1;
        let now = env.ledger().timestamp();
        save_round(
            &env,
            &RoundData {
                round_id,
                answer,
                started_at: now,
                updated_at: now,
                answered_in_round: round_id,
            },
        );
    }

    /// Write round `round_id` verbatim and make it the latest.
    pub fn update_round_data(env: Env, round_id: u64, answer: i128, timestamp: u64, started_at: u64) {
        save_round(
            &env,
            &RoundData {
                round_id,
                answer,
                started_at,
                updated_at: timestamp,
                answered_in_round: round_id,
            },
        );
    }

    pub fn latest_round(env: Env) -> u64 {
        latest_round_id(&env)
    }

    pub fn latest_answer(env: Env) -> Result<i128, Error> {
        Ok(Self::latest_round_data(env)?.answer)
    }

    pub fn latest_round_data(env: Env) -> Result<RoundData, Error> {
        let round_id = latest_round_id(&env);
        Self::get_round_data(env, round_id)
    }

    pub fn get_round_data(env: Env, round_id: u64) -> Result<RoundData, Error> {
        bump(&env);
        env.storage()
            .instance()
            .get(&DataKey::Round(round_id))
            .ok_or(Error::RoundNotFound)
    }
}

fn bump(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn latest_round_id(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::LatestRound)
        .unwrap_or(0)
}

fn save_round(env: &Env, round: &RoundData) {
    env.storage()
        .instance()
        .set(&DataKey::Round(round.round_id), round);
    env.storage()
        .instance()
        .set(&DataKey::LatestRound, &round.round_id);
    bump(env);
}
