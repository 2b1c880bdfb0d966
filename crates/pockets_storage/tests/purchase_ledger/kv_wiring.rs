#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use pockets_contracts::access::TopicId;
use pockets_storage::kv::{MemoryKv, KV_KEY_PURCHASED_ITEMS};
use pockets_storage::profile::ProfileStore;
use pockets_storage::repo::PurchaseLedgerRepo;

fn topic(id: &str) -> TopicId {
    TopicId::new(id).unwrap()
}

#[test]
fn empty_surface_loads_empty_ledger() {
    let store = ProfileStore::new_in_memory();
    assert!(store.load_purchases().is_empty());
}

#[test]
fn add_purchase_then_add_again_keeps_singleton_ledger() {
    let mut store = ProfileStore::new_in_memory();
    assert!(store.add_purchase(&topic("1")).unwrap());
    assert!(!store.add_purchase(&topic("1")).unwrap());
    let expected: BTreeSet<TopicId> = [topic("1")].into_iter().collect();
    assert_eq!(store.load_purchases(), expected);
}

#[test]
fn ledger_grows_monotonically() {
    let mut store = ProfileStore::new_in_memory();
    store.add_purchase(&topic("1")).unwrap();
    store.add_purchase(&topic("3")).unwrap();
    store.add_purchase(&topic("2")).unwrap();
    assert_eq!(store.load_purchases().len(), 3);
}

#[test]
fn malformed_ledger_payload_loads_as_empty() {
    let mut kv = MemoryKv::new();
    kv.put_raw(KV_KEY_PURCHASED_ITEMS, "not an array");
    let store = ProfileStore::new(kv);
    assert!(store.load_purchases().is_empty());
}

#[test]
fn duplicate_and_invalid_entries_are_dropped_on_read() {
    let mut kv = MemoryKv::new();
    kv.put_raw(KV_KEY_PURCHASED_ITEMS, "[\"1\",\"1\",\"\",\"3\"]");
    let store = ProfileStore::new(kv);
    let expected: BTreeSet<TopicId> = [topic("1"), topic("3")].into_iter().collect();
    assert_eq!(store.load_purchases(), expected);
}

#[test]
fn ledger_survives_store_reopen() {
    let mut store = ProfileStore::new_in_memory();
    store.add_purchase(&topic("5")).unwrap();
    let reopened = ProfileStore::new(store.into_kv());
    assert!(reopened.load_purchases().contains(&topic("5")));
}

#[test]
fn clear_purchases_unlinks_the_ledger() {
    let mut store = ProfileStore::new_in_memory();
    store.add_purchase(&topic("1")).unwrap();
    store.clear_purchases();
    assert!(store.load_purchases().is_empty());
}
