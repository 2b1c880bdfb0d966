#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use pockets_contracts::access::TopicId;
use pockets_contracts::audit::{AuditEvent, AuditEventId, AuditEventInput};
use pockets_contracts::quiz::TestResultRecord;
use pockets_contracts::session::UserSession;

use crate::kv::KvSurface;
use crate::profile::{ProfileStore, StorageError};

/// Typed repository interface for the singleton session record.
pub trait SessionRepo {
    fn load_session(&self) -> Option<UserSession>;
    fn save_session(&mut self, record: &UserSession) -> Result<(), StorageError>;
    fn clear_session(&mut self);
}

/// Typed repository interface for the append-only purchase ledger.
pub trait PurchaseLedgerRepo {
    fn load_purchases(&self) -> BTreeSet<TopicId>;
    fn add_purchase(&mut self, topic_id: &TopicId) -> Result<bool, StorageError>;
    fn clear_purchases(&mut self);
}

/// Typed repository interface for informational test results.
pub trait TestResultsRepo {
    fn load_test_results(&self) -> BTreeMap<TopicId, TestResultRecord>;
    fn record_test_result(&mut self, record: &TestResultRecord) -> Result<(), StorageError>;
}

/// Typed repository interface for the short-lived pending-payment carry.
pub trait PendingPaymentRepo {
    fn set_pending_topic(&mut self, topic_id: &TopicId) -> Result<(), StorageError>;
    fn peek_pending_topic(&self) -> Option<TopicId>;
    fn take_pending_topic(&mut self) -> Option<TopicId>;
}

/// Typed repository interface for append-only audit persistence.
pub trait AuditRepo {
    fn append_audit_event(&mut self, input: AuditEventInput)
        -> Result<AuditEventId, StorageError>;
    fn audit_events(&self) -> &[AuditEvent];
}

impl<K: KvSurface> SessionRepo for ProfileStore<K> {
    fn load_session(&self) -> Option<UserSession> {
        ProfileStore::load_session(self)
    }

    fn save_session(&mut self, record: &UserSession) -> Result<(), StorageError> {
        ProfileStore::save_session(self, record)
    }

    fn clear_session(&mut self) {
        ProfileStore::clear_session(self)
    }
}

impl<K: KvSurface> PurchaseLedgerRepo for ProfileStore<K> {
    fn load_purchases(&self) -> BTreeSet<TopicId> {
        ProfileStore::load_purchases(self)
    }

    fn add_purchase(&mut self, topic_id: &TopicId) -> Result<bool, StorageError> {
        ProfileStore::add_purchase(self, topic_id)
    }

    fn clear_purchases(&mut self) {
        ProfileStore::clear_purchases(self)
    }
}

impl<K: KvSurface> TestResultsRepo for ProfileStore<K> {
    fn load_test_results(&self) -> BTreeMap<TopicId, TestResultRecord> {
        ProfileStore::load_test_results(self)
    }

    fn record_test_result(&mut self, record: &TestResultRecord) -> Result<(), StorageError> {
        ProfileStore::record_test_result(self, record)
    }
}

impl<K: KvSurface> PendingPaymentRepo for ProfileStore<K> {
    fn set_pending_topic(&mut self, topic_id: &TopicId) -> Result<(), StorageError> {
        ProfileStore::set_pending_topic(self, topic_id)
    }

    fn peek_pending_topic(&self) -> Option<TopicId> {
        ProfileStore::peek_pending_topic(self)
    }

    fn take_pending_topic(&mut self) -> Option<TopicId> {
        ProfileStore::take_pending_topic(self)
    }
}

impl<K: KvSurface> AuditRepo for ProfileStore<K> {
    fn append_audit_event(
        &mut self,
        input: AuditEventInput,
    ) -> Result<AuditEventId, StorageError> {
        ProfileStore::append_audit_event(self, input)
    }

    fn audit_events(&self) -> &[AuditEvent] {
        ProfileStore::audit_events(self)
    }
}
