//! Ledger properties checked over deterministic sweeps of amounts,
//! callers and funding orders.

extern crate std;

use std::vec::Vec;

use soroban_sdk::{testutils::Address as _, Address};

use crate::invariants::{assert_all_ledger_invariants, assert_ledger_empty, snapshot};
use crate::test::{setup, Fixture, MINIMUM_AMOUNT, SEND_VALUE};
use crate::Error;

/// Funding pattern: (funder index, amount). Indices repeat on purpose.
const PATTERN: [(usize, i128); 9] = [
    (0, MINIMUM_AMOUNT),
    (1, SEND_VALUE),
    (0, 3 * MINIMUM_AMOUNT + 7),
    (2, 999_999),
    (3, MINIMUM_AMOUNT),
    (1, 42 * SEND_VALUE),
    (4, 1_234_567),
    (0, MINIMUM_AMOUNT),
    (2, SEND_VALUE),
];

fn funded_fixture() -> (Fixture, Vec<Address>) {
    let f = setup();
    let funders: Vec<Address> = (0..5).map(|_| f.funder(1_000 * SEND_VALUE)).collect();
    for (index, amount) in PATTERN {
        f.client.fund(&funders[index], &amount);
    }
    (f, funders)
}

#[test]
fn test_below_threshold_never_mutates() {
    let (f, funders) = funded_fixture();
    let before = snapshot(&f, &funders);

    for amount in [i128::MIN, -SEND_VALUE, -1, 0, 1, 1_000, MINIMUM_AMOUNT / 2, MINIMUM_AMOUNT - 1] {
        for funder in &funders {
            assert_eq!(
                f.client.try_fund(funder, &amount),
                Err(Ok(Error::UnderfundedPayment)),
                "amount {amount} was accepted"
            );
        }
    }

    assert_eq!(snapshot(&f, &funders), before);
}

#[test]
fn test_sum_of_records_equals_held_balance() {
    let f = setup();
    let funders: Vec<Address> = (0..5).map(|_| f.funder(1_000 * SEND_VALUE)).collect();

    for (step, (index, amount)) in PATTERN.into_iter().enumerate() {
        f.client.fund(&funders[index], &amount);
        assert_eq!(f.client.get_funder_count(), step as u32 + 1);
        assert_all_ledger_invariants(&f, &funders);
    }

    let expected: i128 = PATTERN.iter().map(|(_, amount)| amount).sum();
    assert_eq!(f.held(), expected);
}

#[test]
fn test_reset_is_idempotent() {
    let (f, funders) = funded_fixture();
    let starting_owner = f.token.balance(&f.owner);
    let held = f.held();

    f.client.withdraw(&f.owner);
    assert_ledger_empty(&f, &funders);

    f.client.cheaper_withdraw(&f.owner);
    f.client.withdraw(&f.owner);
    assert_ledger_empty(&f, &funders);
    assert_eq!(f.token.balance(&f.owner), starting_owner + held);
}

#[test]
fn test_non_owners_never_withdraw() {
    let (f, mut callers) = funded_fixture();
    let funders = callers.clone();
    callers.push(Address::generate(&f.env));
    callers.push(f.client.address.clone());
    let before = snapshot(&f, &funders);

    for caller in &callers {
        assert_eq!(
            f.client.try_withdraw(caller),
            Err(Ok(Error::UnauthorizedCaller))
        );
        assert_eq!(
            f.client.try_cheaper_withdraw(caller),
            Err(Ok(Error::UnauthorizedCaller))
        );
    }

    assert_eq!(snapshot(&f, &funders), before);
}

#[test]
fn test_withdraw_variants_are_equivalent() {
    let (naive, naive_funders) = funded_fixture();
    let (cheaper, cheaper_funders) = funded_fixture();
    assert_eq!(
        snapshot(&naive, &naive_funders),
        snapshot(&cheaper, &cheaper_funders)
    );

    naive.client.withdraw(&naive.owner);
    cheaper.client.cheaper_withdraw(&cheaper.owner);

    assert_eq!(
        snapshot(&naive, &naive_funders),
        snapshot(&cheaper, &cheaper_funders)
    );
    assert_ledger_empty(&naive, &naive_funders);
    assert_ledger_empty(&cheaper, &cheaper_funders);
}

#[test]
fn test_withdraw_variants_agree_across_rounds() {
    let (naive, naive_funders) = funded_fixture();
    let (cheaper, cheaper_funders) = funded_fixture();

    for round in 0..3usize {
        for (index, amount) in PATTERN.into_iter().skip(round) {
            naive.client.fund(&naive_funders[index], &amount);
            cheaper.client.fund(&cheaper_funders[index], &amount);
        }
        naive.client.withdraw(&naive.owner);
        cheaper.client.cheaper_withdraw(&cheaper.owner);

        assert_eq!(
            snapshot(&naive, &naive_funders),
            snapshot(&cheaper, &cheaper_funders),
            "diverged in round {round}"
        );
    }
}
