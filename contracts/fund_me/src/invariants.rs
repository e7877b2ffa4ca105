#![allow(dead_code)]

extern crate std;

use std::vec::Vec;

use soroban_sdk::Address;

use crate::test::Fixture;
use crate::Error;

/// Observable ledger state, reduced to plain numbers so snapshots taken in
/// different environments can be compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// `get_address_to_amount_funded` for each tracked funder, in order.
    pub amounts: Vec<i128>,
    /// Position of each sequence element within the tracked funder list.
    pub sequence: Vec<usize>,
    pub held: i128,
    pub owner_balance: i128,
}

pub fn snapshot(f: &Fixture, funders: &[Address]) -> LedgerSnapshot {
    let amounts = funders
        .iter()
        .map(|funder| f.client.get_address_to_amount_funded(funder))
        .collect();
    let sequence = (0..f.client.get_funder_count())
        .map(|i| {
            let funder = f.client.get_funder(&i);
            funders
                .iter()
                .position(|tracked| *tracked == funder)
                .expect("sequence holds an untracked funder")
        })
        .collect();
    LedgerSnapshot {
        amounts,
        sequence,
        held: f.held(),
        owner_balance: f.token.balance(&f.owner),
    }
}

/// The recorded contributions of `funders` add up to the held balance.
/// `funders` must cover everyone who has funded.
pub fn assert_sum_matches_balance(f: &Fixture, funders: &[Address]) {
    let total: i128 = funders
        .iter()
        .map(|funder| f.client.get_address_to_amount_funded(funder))
        .sum();
    assert_eq!(
        total,
        f.held(),
        "sum of contributions {} != held balance {}",
        total,
        f.held()
    );
}

/// Every funder with a non-zero record is in the sequence, and every
/// sequence element has a non-zero record.
pub fn assert_record_matches_sequence(f: &Fixture, funders: &[Address]) {
    let sequence: Vec<Address> = (0..f.client.get_funder_count())
        .map(|i| f.client.get_funder(&i))
        .collect();
    for funder in funders {
        let amount = f.client.get_address_to_amount_funded(funder);
        assert_eq!(
            amount > 0,
            sequence.contains(funder),
            "record of {:?} ({}) disagrees with the sequence",
            funder,
            amount
        );
    }
    for funder in &sequence {
        assert!(f.client.get_address_to_amount_funded(funder) > 0);
    }
}

/// State after a successful withdrawal.
pub fn assert_ledger_empty(f: &Fixture, funders: &[Address]) {
    assert_eq!(f.held(), 0, "held balance not drained");
    assert_eq!(f.client.get_funder_count(), 0, "funder sequence not cleared");
    assert_eq!(
        f.client.try_get_funder(&0),
        Err(Ok(Error::IndexOutOfBounds))
    );
    for funder in funders {
        assert_eq!(f.client.get_address_to_amount_funded(funder), 0);
    }
}

/// Run all stateful ledger invariants.
pub fn assert_all_ledger_invariants(f: &Fixture, funders: &[Address]) {
    assert_sum_matches_balance(f, funders);
    assert_record_matches_sequence(f, funders);
}
