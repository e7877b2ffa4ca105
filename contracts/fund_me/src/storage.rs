//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by FundMe:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key           | Type           | Description                          |
//! |---------------|----------------|--------------------------------------|
//! | `Config`      | `LedgerConfig` | Owner, price feed and token          |
//! | `FunderCount` | `u32`          | Length of the funder sequence        |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                     | Type      | Description                        |
//! |-------------------------|-----------|------------------------------------|
//! | `Funder(index)`         | `Address` | Funder sequence element            |
//! | `AmountFunded(address)` | `i128`    | Cumulative amount since last reset |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! ## Why index the funder sequence?
//!
//! Storing each funder under its own key lets `fund` append with a single
//! small write instead of rewriting a growing `Vec`. It also makes every
//! element read a separately metered storage access, which is the cost that
//! `cheaper_withdraw` avoids by loading the sequence once.

use soroban_sdk::{contracttype, panic_with_error, Address, Env, Vec};

use crate::types::LedgerConfig;
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Construction-time configuration (Instance).
    Config,
    /// Number of entries in the funder sequence (Instance).
    FunderCount,
    /// Funder sequence element by position (Persistent).
    Funder(u32),
    /// Cumulative contribution of a funder (Persistent).
    AmountFunded(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Store the construction-time configuration.
pub fn save_config(env: &Env, config: &LedgerConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

/// Load the construction-time configuration.
///
/// Fails with `NotInitialized` if the constructor has not stored it.
pub fn load_config(env: &Env) -> LedgerConfig {
    let config = env.storage().instance().get(&DataKey::Config);
    match config {
        Some(config) => {
            bump_instance(env);
            config
        }
        None => panic_with_error!(env, Error::NotInitialized),
    }
}

/// Current length of the funder sequence.
pub fn funder_count(env: &Env) -> u32 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::FunderCount)
        .unwrap_or(0)
}

fn set_funder_count(env: &Env, count: u32) {
    env.storage().instance().set(&DataKey::FunderCount, &count);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Append `funder` to the end of the sequence.
pub fn push_funder(env: &Env, funder: &Address) {
    let index = funder_count(env);
    let key = DataKey::Funder(index);
    env.storage().persistent().set(&key, funder);
    bump_persistent(env, &key);
    set_funder_count(env, index + 1);
}

/// Read a single sequence element. Returns `None` past the end.
pub fn load_funder(env: &Env, index: u32) -> Option<Address> {
    let key = DataKey::Funder(index);
    let funder: Option<Address> = env.storage().persistent().get(&key);
    if funder.is_some() {
        bump_persistent(env, &key);
    }
    funder
}

/// Read the whole sequence into memory with one length read.
pub fn load_funders(env: &Env) -> Vec<Address> {
    let count = funder_count(env);
    let mut funders = Vec::new(env);
    for index in 0..count {
        if let Some(funder) = load_funder(env, index) {
            funders.push_back(funder);
        }
    }
    funders
}

/// Remove the first `count` sequence elements and reset the length to zero.
pub fn clear_funders(env: &Env, count: u32) {
    for index in 0..count {
        env.storage().persistent().remove(&DataKey::Funder(index));
    }
    set_funder_count(env, 0);
}

/// Cumulative contribution of `funder`; zero when absent.
pub fn amount_funded(env: &Env, funder: &Address) -> i128 {
    let key = DataKey::AmountFunded(funder.clone());
    let amount: Option<i128> = env.storage().persistent().get(&key);
    match amount {
        Some(amount) => {
            bump_persistent(env, &key);
            amount
        }
        None => 0,
    }
}

/// Record `total` as the cumulative contribution of `funder`.
pub fn set_amount_funded(env: &Env, funder: &Address, total: i128) {
    let key = DataKey::AmountFunded(funder.clone());
    env.storage().persistent().set(&key, &total);
    bump_persistent(env, &key);
}

/// Drop the contribution entry of `funder`, so later reads return zero.
pub fn reset_amount_funded(env: &Env, funder: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::AmountFunded(funder.clone()));
}
