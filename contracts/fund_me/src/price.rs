//! # Price conversion
//!
//! The ledger never hardcodes an oracle. It talks to whatever contract is
//! stored as `price_feed` through the [`PriceFeed`] interface, so a mock
//! feed on local networks and a production feed elsewhere are
//! interchangeable.
//!
//! ## Units
//!
//! - `amount` is in the token's base units (`10^token_decimals` per whole unit).
//! - `answer` is USD per whole unit, scaled by `10^price_decimals`.
//! - [`usd_value`] returns USD scaled by `10^price_decimals`, so the minimum
//!   comparison happens in the oracle's own precision and no intermediate
//!   18-decimal widening is needed.

use soroban_sdk::{contractclient, Env};

use crate::types::RoundData;

/// Minimum contribution, in whole US dollars.
pub const MINIMUM_USD: i128 = 50;

/// Read-only price oracle interface.
#[contractclient(name = "PriceFeedClient")]
pub trait PriceFeed {
    /// Number of decimals in `RoundData::answer`.
    fn decimals(env: Env) -> u32;
    /// The most recent price round.
    fn latest_round_data(env: Env) -> RoundData;
}

/// USD value of `amount` token base units at `price`.
///
/// Whole units and the remainder are valued separately, so `amount * price`
/// is never formed in full. `None` if the value itself does not fit `i128`.
pub fn usd_value(amount: i128, price: i128, token_decimals: u32) -> Option<i128> {
    let unit = 10i128.checked_pow(token_decimals)?;
    let whole = (amount / unit).checked_mul(price)?;
    let fraction = (amount % unit).checked_mul(price)? / unit;
    whole.checked_add(fraction)
}

/// [`MINIMUM_USD`] expressed in the oracle's precision.
pub fn minimum_usd_scaled(price_decimals: u32) -> Option<i128> {
    10i128
        .checked_pow(price_decimals)?
        .checked_mul(MINIMUM_USD)
}

/// Whether `amount` is worth at least [`MINIMUM_USD`]. Exactly the minimum passes.
///
/// `price` must be positive. A value too large for `i128` is above any minimum.
pub fn meets_minimum(amount: i128, price: i128, price_decimals: u32, token_decimals: u32) -> bool {
    if amount <= 0 {
        return false;
    }
    let Some(minimum) = minimum_usd_scaled(price_decimals) else {
        return false;
    };
    usd_value(amount, price, token_decimals).map_or(true, |usd| usd >= minimum)
}
