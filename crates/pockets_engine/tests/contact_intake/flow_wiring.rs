#![forbid(unsafe_code)]

use pockets_contracts::contact::{ContactRequest, CONTACT_CONTRACT_VERSION};
use pockets_contracts::MonotonicTimeNs;
use pockets_engine::auth::{AuthRequest, AuthRuntime};
use pockets_engine::contact_relay::{reason_codes, relay_contact, ContactSenderRuntime};
use pockets_storage::profile::ProfileStore;

fn request() -> ContactRequest {
    ContactRequest::v1(
        "Anna".to_string(),
        "+7 (902) 510 19 23".to_string(),
        "interested in the course".to_string(),
    )
    .unwrap()
}

#[test]
fn anonymous_submission_is_relayed_and_audited() {
    let mut store = ProfileStore::new_in_memory();
    let sender = ContactSenderRuntime::LoopbackAck;
    let report = relay_contact(&mut store, MonotonicTimeNs(10), &sender, &request()).unwrap();
    assert!(report.outcome.is_ok());

    let events = store.audit_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_id, report.audit_event_id);
    assert_eq!(events[0].reason_code, reason_codes::CONTACT_RELAY_OK);
    assert_eq!(events[0].user_id, None);
}

#[test]
fn signed_in_submission_carries_the_user_id() {
    let mut store = ProfileStore::new_in_memory();
    AuthRuntime::default()
        .run(&mut store, MonotonicTimeNs(1), &AuthRequest::TestAccount)
        .unwrap();
    let sender = ContactSenderRuntime::LoopbackAck;
    relay_contact(&mut store, MonotonicTimeNs(2), &sender, &request()).unwrap();

    let relayed = store.audit_events().last().unwrap();
    assert_eq!(relayed.reason_code, reason_codes::CONTACT_RELAY_OK);
    assert!(relayed.user_id.is_some());
}

#[test]
fn invalid_submission_fails_the_relay_but_still_audits() {
    let mut store = ProfileStore::new_in_memory();
    let sender = ContactSenderRuntime::LoopbackAck;
    // Bypass the constructor to model a payload that went stale or was
    // assembled by an untrusted caller.
    let bad = ContactRequest {
        schema_version: CONTACT_CONTRACT_VERSION,
        name: "Anna".to_string(),
        phone: "12345".to_string(),
        message: String::new(),
    };
    let report = relay_contact(&mut store, MonotonicTimeNs(10), &sender, &bad).unwrap();
    assert!(report.outcome.is_err());
    assert_eq!(
        store.audit_events()[0].reason_code,
        reason_codes::CONTACT_RELAY_FAILED
    );
}

#[test]
fn each_submission_is_a_single_attempt() {
    let mut store = ProfileStore::new_in_memory();
    let sender = ContactSenderRuntime::LoopbackAck;
    relay_contact(&mut store, MonotonicTimeNs(1), &sender, &request()).unwrap();
    relay_contact(&mut store, MonotonicTimeNs(2), &sender, &request()).unwrap();
    assert_eq!(store.audit_events().len(), 2);
}
