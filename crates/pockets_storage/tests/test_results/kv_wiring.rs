#![forbid(unsafe_code)]

use pockets_contracts::access::TopicId;
use pockets_contracts::quiz::{ScorePercent, TestResultRecord};
use pockets_contracts::MonotonicTimeNs;
use pockets_storage::kv::{MemoryKv, KV_KEY_TEST_RESULTS};
use pockets_storage::profile::ProfileStore;
use pockets_storage::repo::TestResultsRepo;

fn topic(id: &str) -> TopicId {
    TopicId::new(id).unwrap()
}

fn result(id: &str, percent: u8, at: u64) -> TestResultRecord {
    TestResultRecord::v1(
        topic(id),
        ScorePercent::new(percent).unwrap(),
        MonotonicTimeNs(at),
    )
    .unwrap()
}

#[test]
fn record_then_load_round_trips() {
    let mut store = ProfileStore::new_in_memory();
    store.record_test_result(&result("1", 67, 10)).unwrap();
    let results = store.load_test_results();
    assert_eq!(results.get(&topic("1")), Some(&result("1", 67, 10)));
}

#[test]
fn retake_overwrites_previous_result() {
    let mut store = ProfileStore::new_in_memory();
    store.record_test_result(&result("1", 33, 10)).unwrap();
    store.record_test_result(&result("1", 100, 20)).unwrap();
    let results = store.load_test_results();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results.get(&topic("1")).unwrap().percentage.value(),
        100
    );
}

#[test]
fn results_for_different_topics_coexist() {
    let mut store = ProfileStore::new_in_memory();
    store.record_test_result(&result("1", 67, 10)).unwrap();
    store.record_test_result(&result("2", 100, 20)).unwrap();
    assert_eq!(store.load_test_results().len(), 2);
}

#[test]
fn malformed_results_payload_loads_as_empty() {
    let mut kv = MemoryKv::new();
    kv.put_raw(KV_KEY_TEST_RESULTS, "[1,2,3]");
    let store = ProfileStore::new(kv);
    assert!(store.load_test_results().is_empty());
}

#[test]
fn out_of_range_persisted_percentage_is_dropped() {
    let mut kv = MemoryKv::new();
    kv.put_raw(
        KV_KEY_TEST_RESULTS,
        "{\"1\":{\"percentage\":150,\"recorded_at_ns\":5}}",
    );
    let store = ProfileStore::new(kv);
    assert!(store.load_test_results().is_empty());
}
