//! # FundMe Contract
//!
//! A crowdfunding ledger. Anyone may fund it with at least [`MINIMUM_USD`]
//! worth of the configured token, valued through an external price feed;
//! only the owner may withdraw, which pays out the whole balance and resets
//! every contribution record.
//!
//! | Phase      | Entry Point(s)                                              |
//! |------------|-------------------------------------------------------------|
//! | Deployment | `__constructor`                                             |
//! | Funding    | [`FundMe::fund`]                                            |
//! | Withdrawal | [`FundMe::withdraw`], [`FundMe::cheaper_withdraw`]          |
//! | Queries    | `get_address_to_amount_funded`, `get_funder`, `get_funder_count`, `get_owner`, `get_price_feed`, `get_token`, `get_conversion_rate`, `minimum_usd` |
//!
//! ## Architecture
//!
//! Storage access is delegated to [`storage`], USD valuation and the oracle
//! interface to [`price`], and event shapes to [`events`]. This file holds
//! the entry points and the authorization checks.
//!
//! ## Atomicity
//!
//! Fallible entry points return `Result<_, Error>`. The host rolls back all
//! storage writes and token transfers of a call that returns an error or
//! panics, so no failed `fund` or withdrawal leaves partial state behind.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env};

pub mod events;
pub mod price;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_properties;

pub use events::{FundedEvent, WithdrawnEvent};
pub use price::{PriceFeedClient, MINIMUM_USD};
pub use types::{LedgerConfig, RoundData};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    UnderfundedPayment = 1,
    UnauthorizedCaller = 2,
    IndexOutOfBounds   = 3,
    InvalidPrice       = 4,
    ArithmeticOverflow = 5,
    NotInitialized     = 6,
}

#[contract]
pub struct FundMe;

#[contractimpl]
impl FundMe {
    /// Fix the owner, price feed and token for the lifetime of the contract.
    ///
    /// - `owner` must sign the deployment.
    pub fn __constructor(env: Env, owner: Address, price_feed: Address, token: Address) {
        owner.require_auth();
        storage::save_config(
            &env,
            &LedgerConfig {
                owner,
                price_feed,
                token,
            },
        );
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` token base units.
    ///
    /// Fails with `UnderfundedPayment` if `amount` is worth less than
    /// [`MINIMUM_USD`] at the current oracle price. The price check runs
    /// before any token moves.
    pub fn fund(env: Env, funder: Address, amount: i128) -> Result<(), Error> {
        funder.require_auth();

        let config = storage::load_config(&env);
        let token_client = token::Client::new(&env, &config.token);
        let (answer, price_decimals) = current_price(&env, &config.price_feed)?;

        if !price::meets_minimum(amount, answer, price_decimals, token_client.decimals()) {
            return Err(Error::UnderfundedPayment);
        }

        let total = storage::amount_funded(&env, &funder)
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;

        token_client.transfer(&funder, &env.current_contract_address(), &amount);

        storage::set_amount_funded(&env, &funder, total);
        storage::push_funder(&env, &funder);

        events::emit_funded(&env, &funder, amount, total);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Withdrawal
    // ─────────────────────────────────────────────────────────

    /// Pay the whole balance to the owner and reset every contribution.
    ///
    /// Walks the funder sequence straight out of storage: both the length
    /// and each element are re-read on every iteration.
    pub fn withdraw(env: Env, caller: Address) -> Result<(), Error> {
        let config = require_owner(&env, &caller)?;

        let mut index = 0;
        while index < storage::funder_count(&env) {
            if let Some(funder) = storage::load_funder(&env, index) {
                storage::reset_amount_funded(&env, &funder);
            }
            index += 1;
        }

        let funder_count = storage::funder_count(&env);
        storage::clear_funders(&env, funder_count);

        pay_out(&env, &config, funder_count);
        Ok(())
    }

    /// Same effect as [`FundMe::withdraw`], but loads the funder sequence
    /// into memory once before touching any persistent entry.
    pub fn cheaper_withdraw(env: Env, caller: Address) -> Result<(), Error> {
        let config = require_owner(&env, &caller)?;

        let funders = storage::load_funders(&env);
        for funder in funders.iter() {
            storage::reset_amount_funded(&env, &funder);
        }
        storage::clear_funders(&env, funders.len());

        pay_out(&env, &config, funders.len());
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Cumulative contribution of `funder` since the last withdrawal.
    pub fn get_address_to_amount_funded(env: Env, funder: Address) -> i128 {
        storage::amount_funded(&env, &funder)
    }

    /// Funder at position `index` of the sequence.
    pub fn get_funder(env: Env, index: u32) -> Result<Address, Error> {
        storage::load_funder(&env, index).ok_or(Error::IndexOutOfBounds)
    }

    pub fn get_funder_count(env: Env) -> u32 {
        storage::funder_count(&env)
    }

    pub fn get_owner(env: Env) -> Address {
        storage::load_config(&env).owner
    }

    pub fn get_price_feed(env: Env) -> Address {
        storage::load_config(&env).price_feed
    }

    pub fn get_token(env: Env) -> Address {
        storage::load_config(&env).token
    }

    /// USD value of `amount` at the current price, in the oracle's precision.
    pub fn get_conversion_rate(env: Env, amount: i128) -> Result<i128, Error> {
        let config = storage::load_config(&env);
        let (answer, _) = current_price(&env, &config.price_feed)?;
        let token_decimals = token::Client::new(&env, &config.token).decimals();
        price::usd_value(amount, answer, token_decimals).ok_or(Error::ArithmeticOverflow)
    }

    pub fn minimum_usd(_env: Env) -> i128 {
        MINIMUM_USD
    }
}

/// Load the config and reject anyone but the owner.
fn require_owner(env: &Env, caller: &Address) -> Result<LedgerConfig, Error> {
    let config = storage::load_config(env);
    if *caller != config.owner {
        return Err(Error::UnauthorizedCaller);
    }
    caller.require_auth();
    Ok(config)
}

/// Latest oracle answer and its decimals.
///
/// Non-positive answers are rejected, as are decimals too large for the
/// minimum to be expressed in `i128`.
fn current_price(env: &Env, price_feed: &Address) -> Result<(i128, u32), Error> {
    let feed = PriceFeedClient::new(env, price_feed);
    let round = feed.latest_round_data();
    let decimals = feed.decimals();
    if round.answer <= 0 || price::minimum_usd_scaled(decimals).is_none() {
        return Err(Error::InvalidPrice);
    }
    Ok((round.answer, decimals))
}

/// Transfer the whole held balance to the owner and announce it.
fn pay_out(env: &Env, config: &LedgerConfig, funder_count: u32) {
    let token_client = token::Client::new(env, &config.token);
    let contract = env.current_contract_address();
    let balance = token_client.balance(&contract);
    if balance > 0 {
        token_client.transfer(&contract, &config.owner, &balance);
    }
    events::emit_withdrawn(env, &config.owner, balance, funder_count);
}
