#![forbid(unsafe_code)]

use pockets_contracts::access::{TopicId, TopicPageView};
use pockets_contracts::payment::PurchaseFlowState;
use pockets_contracts::quiz::TestGrade;
use pockets_contracts::MonotonicTimeNs;
use pockets_engine::access::TopicGate;
use pockets_engine::auth::{AuthRequest, AuthRuntime};
use pockets_engine::payment::{PurchaseFlowRuntime, PurchaseStepOutcome};
use pockets_engine::quiz::record_test_outcome;
use pockets_storage::kv::{MemoryKv, KV_KEY_PURCHASED_ITEMS};
use pockets_storage::profile::ProfileStore;

const SECOND_NS: u64 = 1_000_000_000;

fn topic(id: &str) -> TopicId {
    TopicId::new(id).unwrap()
}

fn at(seconds: u64) -> MonotonicTimeNs {
    MonotonicTimeNs(seconds * SECOND_NS)
}

fn register(store: &mut ProfileStore<MemoryKv>, now: MonotonicTimeNs) {
    let response = AuthRuntime::default()
        .run(
            store,
            now,
            &AuthRequest::Register {
                name: "Anna".to_string(),
                email: "anna@example.com".to_string(),
                password: "secret1".to_string(),
                password_confirm: "secret1".to_string(),
            },
        )
        .unwrap();
    assert!(response.is_ok());
}

fn buy(store: &mut ProfileStore<MemoryKv>, from: MonotonicTimeNs, topic_id: &TopicId) {
    let mut flow = PurchaseFlowRuntime::default();
    assert!(matches!(
        flow.select(store, from, topic_id).unwrap(),
        PurchaseStepOutcome::Transitioned(_)
    ));
    assert!(matches!(
        flow.confirm(from).unwrap(),
        PurchaseStepOutcome::Transitioned(_)
    ));
    let due = MonotonicTimeNs(from.0 + 3 * SECOND_NS);
    assert!(matches!(
        flow.poll(store, due).unwrap(),
        PurchaseStepOutcome::Transitioned(_)
    ));
    assert_eq!(flow.state(), PurchaseFlowState::Completed);
}

#[test]
fn visitor_signs_in_buys_and_reads_the_topic() {
    let mut store = ProfileStore::new_in_memory();
    let the_topic = topic("2");

    let view = TopicGate::check(&mut store, at(1), &the_topic).unwrap();
    assert_eq!(view, TopicPageView::AuthRequired);

    register(&mut store, at(2));
    let view = TopicGate::check(&mut store, at(3), &the_topic).unwrap();
    assert_eq!(view, TopicPageView::PurchaseRequired(the_topic.clone()));

    buy(&mut store, at(4), &the_topic);
    let view = TopicGate::check(&mut store, at(10), &the_topic).unwrap();
    assert_eq!(view, TopicPageView::TopicContent(the_topic));
}

#[test]
fn ownership_is_per_topic() {
    let mut store = ProfileStore::new_in_memory();
    register(&mut store, at(1));
    buy(&mut store, at(2), &topic("2"));

    let owned = TopicGate::check(&mut store, at(10), &topic("2")).unwrap();
    assert_eq!(owned, TopicPageView::TopicContent(topic("2")));
    let other = TopicGate::check(&mut store, at(11), &topic("3")).unwrap();
    assert_eq!(other, TopicPageView::PurchaseRequired(topic("3")));
}

#[test]
fn purchases_survive_logout_and_relogin() {
    let mut store = ProfileStore::new_in_memory();
    let rt = AuthRuntime::default();
    rt.run(&mut store, at(1), &AuthRequest::TestAccount).unwrap();
    buy(&mut store, at(2), &topic("1"));

    rt.run(&mut store, at(10), &AuthRequest::Logout).unwrap();
    let view = TopicGate::check(&mut store, at(11), &topic("1")).unwrap();
    assert_eq!(view, TopicPageView::AuthRequired);

    rt.run(&mut store, at(12), &AuthRequest::TestAccount).unwrap();
    let view = TopicGate::check(&mut store, at(13), &topic("1")).unwrap();
    assert_eq!(view, TopicPageView::TopicContent(topic("1")));
}

#[test]
fn test_results_never_open_the_gate() {
    let mut store = ProfileStore::new_in_memory();
    register(&mut store, at(1));

    let grade = record_test_outcome(&mut store, at(2), &topic("4"), 10, 10).unwrap();
    assert_eq!(grade, TestGrade::Excellent);

    // A perfect score is not a purchase.
    let view = TopicGate::check(&mut store, at(3), &topic("4")).unwrap();
    assert_eq!(view, TopicPageView::PurchaseRequired(topic("4")));
}

#[test]
fn corrupt_ledger_payload_degrades_to_no_ownership() {
    let mut kv = MemoryKv::new();
    kv.put_raw(KV_KEY_PURCHASED_ITEMS, "{\"oops\":true}");
    let mut store = ProfileStore::new(kv);
    register(&mut store, at(1));

    let view = TopicGate::check(&mut store, at(2), &topic("1")).unwrap();
    assert_eq!(view, TopicPageView::PurchaseRequired(topic("1")));

    // The next purchase rebuilds a clean ledger over the corrupt payload.
    buy(&mut store, at(3), &topic("1"));
    let view = TopicGate::check(&mut store, at(10), &topic("1")).unwrap();
    assert_eq!(view, TopicPageView::TopicContent(topic("1")));
}

#[test]
fn every_step_of_the_journey_leaves_audit_rows() {
    let mut store = ProfileStore::new_in_memory();
    register(&mut store, at(1));
    buy(&mut store, at(2), &topic("5"));
    record_test_outcome(&mut store, at(10), &topic("5"), 8, 10).unwrap();
    TopicGate::check(&mut store, at(11), &topic("5")).unwrap();

    let events = store.audit_events();
    assert!(events.len() >= 4);
    for pair in events.windows(2) {
        assert!(pair[0].event_id < pair[1].event_id);
    }
}
