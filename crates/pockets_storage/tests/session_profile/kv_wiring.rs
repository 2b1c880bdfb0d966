#![forbid(unsafe_code)]

use pockets_contracts::session::{UserId, UserRole, UserSession};
use pockets_contracts::MonotonicTimeNs;
use pockets_storage::kv::{KvSurface, MemoryKv, KV_KEY_CURRENT_SESSION};
use pockets_storage::profile::ProfileStore;
use pockets_storage::repo::SessionRepo;

fn sample_session(user_id: &str) -> UserSession {
    UserSession::v1(
        UserId::new(user_id).unwrap(),
        "Anna".to_string(),
        "anna@example.com".to_string(),
        UserRole::User,
        MonotonicTimeNs(42),
    )
    .unwrap()
}

#[test]
fn save_load_round_trip_preserves_record() {
    let mut store = ProfileStore::new_in_memory();
    let session = sample_session("1700000000000");
    store.save_session(&session).unwrap();
    assert_eq!(store.load_session(), Some(session));
}

#[test]
fn save_fully_replaces_prior_record() {
    let mut store = ProfileStore::new_in_memory();
    store.save_session(&sample_session("first")).unwrap();
    let second = sample_session("second");
    store.save_session(&second).unwrap();
    assert_eq!(store.load_session(), Some(second));
}

#[test]
fn clear_removes_record() {
    let mut store = ProfileStore::new_in_memory();
    store.save_session(&sample_session("user_1")).unwrap();
    store.clear_session();
    assert_eq!(store.load_session(), None);
}

#[test]
fn missing_key_loads_as_absence() {
    let store = ProfileStore::new_in_memory();
    assert_eq!(store.load_session(), None);
}

#[test]
fn malformed_json_loads_as_absence_not_error() {
    let mut kv = MemoryKv::new();
    kv.put_raw(KV_KEY_CURRENT_SESSION, "{\"user_id\": 12}");
    let store = ProfileStore::new(kv);
    assert_eq!(store.load_session(), None);
}

#[test]
fn contract_invalid_payload_loads_as_absence() {
    // Shape parses, but the empty user id violates the session contract.
    let mut kv = MemoryKv::new();
    kv.put_raw(
        KV_KEY_CURRENT_SESSION,
        "{\"schema_version\":1,\"user_id\":\"\",\"display_name\":\"Anna\",\
         \"login_email\":\"anna@example.com\",\"role\":\"user\",\"created_at_ns\":1}",
    );
    let store = ProfileStore::new(kv);
    assert_eq!(store.load_session(), None);
}

#[test]
fn unknown_role_label_loads_as_absence() {
    let mut kv = MemoryKv::new();
    kv.put_raw(
        KV_KEY_CURRENT_SESSION,
        "{\"schema_version\":1,\"user_id\":\"u1\",\"display_name\":\"Anna\",\
         \"login_email\":\"anna@example.com\",\"role\":\"owner\",\"created_at_ns\":1}",
    );
    let store = ProfileStore::new(kv);
    assert_eq!(store.load_session(), None);
}

#[test]
fn two_stores_over_the_same_surface_agree() {
    // No caller-side cache: the second store sees the first one's write.
    let mut store = ProfileStore::new_in_memory();
    let session = sample_session("shared");
    store.save_session(&session).unwrap();
    let kv = store.into_kv();
    assert!(kv.get(KV_KEY_CURRENT_SESSION).is_some());
    let reopened = ProfileStore::new(kv);
    assert_eq!(reopened.load_session(), Some(session));
}
