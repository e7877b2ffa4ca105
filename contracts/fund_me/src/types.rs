//! # Types
//!
//! Shared data structures used across the FundMe contract.
//!
//! ## Config / ledger split
//!
//! The contract keeps two kinds of state:
//!
//! - [`LedgerConfig`] — written once by the constructor; never mutated.
//! - The contribution ledger — per-funder amounts plus the ordered funder
//!   sequence, appended to by `fund` and cleared by the withdrawals.
//!
//! [`RoundData`] is the shape returned by the price oracle. It is declared
//! here so the oracle client in [`crate::price`] can decode it; any contract
//! returning a struct with the same field names is compatible.

use soroban_sdk::{contracttype, Address};

/// Construction-time configuration.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    /// The only address allowed to withdraw.
    pub owner: Address,
    /// Oracle quoting USD per whole unit of `token`.
    pub price_feed: Address,
    /// Token accepted by `fund` (the native asset's SAC on a real network).
    pub token: Address,
}

/// One price round as reported by the oracle.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundData {
    pub round_id: u64,
    /// USD per whole unit, scaled by the oracle's `decimals()`.
    pub answer: i128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u64,
}
