extern crate std;

use soroban_sdk::{symbol_short, testutils::Events, vec, IntoVal, TryIntoVal};

use crate::events::{FundedEvent, WithdrawnEvent};
use crate::test::{setup, SEND_VALUE};

#[test]
fn test_funded_event() {
    let f = setup();
    let funder = f.funder(2 * SEND_VALUE);

    f.client.fund(&funder, &SEND_VALUE);
    f.client.fund(&funder, &SEND_VALUE);

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("funded"), funder)
    assert_eq!(last_event.0, f.client.address);
    let expected_topics = vec![
        &f.env,
        symbol_short!("funded").into_val(&f.env),
        funder.into_val(&f.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: FundedEvent = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        FundedEvent {
            funder: funder.clone(),
            amount: SEND_VALUE,
            total: 2 * SEND_VALUE,
        }
    );
}

#[test]
fn test_withdrawn_event() {
    let f = setup();
    let alice = f.funder(SEND_VALUE);
    let bob = f.funder(SEND_VALUE);
    f.client.fund(&alice, &SEND_VALUE);
    f.client.fund(&bob, &SEND_VALUE);

    f.client.withdraw(&f.owner);

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("withdrawn"), owner)
    assert_eq!(last_event.0, f.client.address);
    let expected_topics = vec![
        &f.env,
        symbol_short!("withdrawn").into_val(&f.env),
        f.owner.into_val(&f.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: WithdrawnEvent = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        WithdrawnEvent {
            owner: f.owner.clone(),
            amount: 2 * SEND_VALUE,
            funder_count: 2,
        }
    );
}

#[test]
fn test_cheaper_withdraw_emits_same_event() {
    let f = setup();
    let funder = f.funder(SEND_VALUE);
    f.client.fund(&funder, &SEND_VALUE);

    f.client.cheaper_withdraw(&f.owner);

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");
    let event_data: WithdrawnEvent = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        WithdrawnEvent {
            owner: f.owner.clone(),
            amount: SEND_VALUE,
            funder_count: 1,
        }
    );
}

#[test]
fn test_empty_withdraw_reports_zero() {
    let f = setup();

    f.client.withdraw(&f.owner);

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");
    let event_data: WithdrawnEvent = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(event_data.amount, 0);
    assert_eq!(event_data.funder_count, 0);
}
