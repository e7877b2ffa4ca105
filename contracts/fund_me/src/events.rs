//! # Events
//!
//! | Topics                  | Data             |
//! |-------------------------|------------------|
//! | `("funded", funder)`    | [`FundedEvent`]    |
//! | `("withdrawn", owner)`  | [`WithdrawnEvent`] |
//!
//! The off-chain indexer keys on the leading symbol, so topic names are part
//! of the public interface.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

/// A payment was accepted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundedEvent {
    pub funder: Address,
    pub amount: i128,
    /// Funder's cumulative contribution after this payment.
    pub total: i128,
}

/// The owner drained the ledger.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub owner: Address,
    pub amount: i128,
    /// Length of the funder sequence that was cleared.
    pub funder_count: u32,
}

pub fn emit_funded(env: &Env, funder: &Address, amount: i128, total: i128) {
    env.events().publish(
        (symbol_short!("funded"), funder.clone()),
        FundedEvent {
            funder: funder.clone(),
            amount,
            total,
        },
    );
}

pub fn emit_withdrawn(env: &Env, owner: &Address, amount: i128, funder_count: u32) {
    env.events().publish(
        (symbol_short!("withdrawn"), owner.clone()),
        WithdrawnEvent {
            owner: owner.clone(),
            amount,
            funder_count,
        },
    );
}
