#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use pockets_contracts::access::TopicId;
use pockets_contracts::audit::{AuditEvent, AuditEventId, AuditEventInput};
use pockets_contracts::quiz::{ScorePercent, TestResultRecord};
use pockets_contracts::session::{UserId, UserRole, UserSession};
use pockets_contracts::{ContractViolation, MonotonicTimeNs, Validate};

use crate::kv::{
    KvSurface, MemoryKv, KV_KEY_CURRENT_SESSION, KV_KEY_PENDING_PAYMENT, KV_KEY_PURCHASED_ITEMS,
    KV_KEY_TEST_RESULTS,
};

#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    ContractViolation(ContractViolation),
    Encode { reason: String },
}

impl From<ContractViolation> for StorageError {
    fn from(v: ContractViolation) -> Self {
        StorageError::ContractViolation(v)
    }
}

/// Persisted shape of the session record. Contract types stay plain; the
/// serde derives live on this envelope only.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
struct SessionEnvelope {
    schema_version: u8,
    user_id: String,
    display_name: String,
    login_email: String,
    role: String,
    created_at_ns: u64,
}

impl SessionEnvelope {
    fn from_record(record: &UserSession) -> Self {
        Self {
            schema_version: 1,
            user_id: record.user_id.as_str().to_string(),
            display_name: record.display_name.clone(),
            login_email: record.login_email.clone(),
            role: record.role.label().to_string(),
            created_at_ns: record.created_at.0,
        }
    }

    fn into_record(self) -> Option<UserSession> {
        if self.schema_version != 1 {
            return None;
        }
        let user_id = UserId::new(self.user_id).ok()?;
        let role = UserRole::from_label(&self.role)?;
        UserSession::v1(
            user_id,
            self.display_name,
            self.login_email,
            role,
            MonotonicTimeNs(self.created_at_ns),
        )
        .ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
struct TestResultEnvelope {
    percentage: u8,
    recorded_at_ns: u64,
}

/// The Session Store over one key-value surface.
///
/// No session/ledger/test state is cached in memory: every read re-parses
/// the persisted string, so two stores over the same surface always agree.
/// Malformed persisted payloads decode to absence, never to errors.
#[derive(Debug)]
pub struct ProfileStore<K: KvSurface> {
    kv: K,
    audit_events: Vec<AuditEvent>,
    next_audit_event_id: u64,
}

impl ProfileStore<MemoryKv> {
    pub fn new_in_memory() -> Self {
        Self::new(MemoryKv::new())
    }
}

impl<K: KvSurface> ProfileStore<K> {
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            audit_events: Vec::new(),
            next_audit_event_id: 1,
        }
    }

    pub fn into_kv(self) -> K {
        self.kv
    }

    // ------------------------
    // UserSession (singleton record).
    // ------------------------

    pub fn load_session(&self) -> Option<UserSession> {
        let raw = self.kv.get(KV_KEY_CURRENT_SESSION)?;
        let envelope: SessionEnvelope = serde_json::from_str(&raw).ok()?;
        envelope.into_record()
    }

    pub fn save_session(&mut self, record: &UserSession) -> Result<(), StorageError> {
        record.validate()?;
        let payload = encode(&SessionEnvelope::from_record(record))?;
        self.kv.set(KV_KEY_CURRENT_SESSION, payload);
        Ok(())
    }

    pub fn clear_session(&mut self) {
        self.kv.remove(KV_KEY_CURRENT_SESSION);
    }

    // ------------------------
    // Purchase ledger (append-only, deduplicated).
    // ------------------------

    pub fn load_purchases(&self) -> BTreeSet<TopicId> {
        let Some(raw) = self.kv.get(KV_KEY_PURCHASED_ITEMS) else {
            return BTreeSet::new();
        };
        let Ok(ids) = serde_json::from_str::<Vec<String>>(&raw) else {
            return BTreeSet::new();
        };
        // Duplicates and invalid ids are dropped on read.
        ids.into_iter()
            .filter_map(|id| TopicId::new(id).ok())
            .collect()
    }

    /// Idempotent append. Returns `false` when the topic was already in
    /// the ledger (the write is skipped entirely).
    pub fn add_purchase(&mut self, topic_id: &TopicId) -> Result<bool, StorageError> {
        topic_id.validate()?;
        let mut ledger = self.load_purchases();
        if !ledger.insert(topic_id.clone()) {
            return Ok(false);
        }
        let ids: Vec<&str> = ledger.iter().map(TopicId::as_str).collect();
        let payload = encode(&ids)?;
        self.kv.set(KV_KEY_PURCHASED_ITEMS, payload);
        Ok(true)
    }

    /// Unlink hook for the logout redesign: the observed product never
    /// shrinks the ledger, so this is only reached behind an explicit
    /// configuration flag.
    pub fn clear_purchases(&mut self) {
        self.kv.remove(KV_KEY_PURCHASED_ITEMS);
    }

    // ------------------------
    // Test results (informational; never access-gating).
    // ------------------------

    pub fn load_test_results(&self) -> BTreeMap<TopicId, TestResultRecord> {
        self.load_test_result_envelopes()
            .into_iter()
            .filter_map(|(id, envelope)| {
                let topic_id = TopicId::new(id).ok()?;
                let percentage = ScorePercent::new(envelope.percentage).ok()?;
                let record = TestResultRecord::v1(
                    topic_id.clone(),
                    percentage,
                    MonotonicTimeNs(envelope.recorded_at_ns),
                )
                .ok()?;
                Some((topic_id, record))
            })
            .collect()
    }

    /// Per-topic upsert: retaking a test overwrites the previous result.
    pub fn record_test_result(&mut self, record: &TestResultRecord) -> Result<(), StorageError> {
        record.validate()?;
        let mut map = self.load_test_result_envelopes();
        map.insert(
            record.topic_id.as_str().to_string(),
            TestResultEnvelope {
                percentage: record.percentage.value(),
                recorded_at_ns: record.recorded_at.0,
            },
        );
        let payload = encode(&map)?;
        self.kv.set(KV_KEY_TEST_RESULTS, payload);
        Ok(())
    }

    fn load_test_result_envelopes(&self) -> BTreeMap<String, TestResultEnvelope> {
        let Some(raw) = self.kv.get(KV_KEY_TEST_RESULTS) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    // ------------------------
    // Pending payment item (short-lived navigation carry).
    // ------------------------

    pub fn set_pending_topic(&mut self, topic_id: &TopicId) -> Result<(), StorageError> {
        topic_id.validate()?;
        self.kv
            .set(KV_KEY_PENDING_PAYMENT, topic_id.as_str().to_string());
        Ok(())
    }

    pub fn peek_pending_topic(&self) -> Option<TopicId> {
        let raw = self.kv.get(KV_KEY_PENDING_PAYMENT)?;
        TopicId::new(raw).ok()
    }

    pub fn take_pending_topic(&mut self) -> Option<TopicId> {
        let topic_id = self.peek_pending_topic();
        self.kv.remove(KV_KEY_PENDING_PAYMENT);
        topic_id
    }

    // ------------------------
    // Audit trail (append-only, in-memory diagnostics).
    // ------------------------

    pub fn append_audit_event(
        &mut self,
        input: AuditEventInput,
    ) -> Result<AuditEventId, StorageError> {
        input.validate()?;
        let event_id = AuditEventId(self.next_audit_event_id);
        self.next_audit_event_id = self.next_audit_event_id.saturating_add(1);
        let event = AuditEvent::from_input_v1(event_id, input)?;
        self.audit_events.push(event);
        Ok(event_id)
    }

    pub fn audit_events(&self) -> &[AuditEvent] {
        &self.audit_events
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|err| StorageError::Encode {
        reason: err.to_string(),
    })
}
