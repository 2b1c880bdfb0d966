#![forbid(unsafe_code)]

use std::collections::BTreeMap;

/// Logical key names of the shared persistent surface, one per stored
/// concern.
pub const KV_KEY_CURRENT_SESSION: &str = "current-session";
pub const KV_KEY_PURCHASED_ITEMS: &str = "purchased-items";
pub const KV_KEY_TEST_RESULTS: &str = "test-results";
pub const KV_KEY_PENDING_PAYMENT: &str = "pending-payment-item";

/// The string key-value persistence surface. Every store operation goes
/// through this trait; callers never see raw payloads.
pub trait KvSurface {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory surface standing in for one browser profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: BTreeMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw payload directly, bypassing the typed store. Used by
    /// wiring tests to plant malformed persisted state.
    pub fn put_raw(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KvSurface for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
