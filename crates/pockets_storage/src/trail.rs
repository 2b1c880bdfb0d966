#![forbid(unsafe_code)]

use pockets_contracts::audit::{AuditEventId, AuditEventInput};

use crate::kv::KvSurface;
use crate::profile::{ProfileStore, StorageError};

/// Audit trail runtime wrapper.
///
/// A disciplined append-only writer into the store's audit ledger; this
/// ledger is the system's whole observability surface.
#[derive(Debug, Default)]
pub struct AuditTrail;

impl AuditTrail {
    pub fn emit<K: KvSurface>(
        store: &mut ProfileStore<K>,
        input: AuditEventInput,
    ) -> Result<AuditEventId, StorageError> {
        store.append_audit_event(input)
    }
}
