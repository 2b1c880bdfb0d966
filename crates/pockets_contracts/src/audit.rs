#![forbid(unsafe_code)]

use crate::access::TopicId;
use crate::session::UserId;
use crate::{ContractViolation, MonotonicTimeNs, ReasonCodeId, SchemaVersion, Validate};

pub const AUDIT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AuditEventId(pub u64);

impl Validate for AuditEventId {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "audit_event_id",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditEventKind {
    LoginOk,
    LoginRefused,
    RegisterOk,
    RegisterRefused,
    Logout,
    AccessGranted,
    AccessRefused,
    PurchaseRecorded,
    TestResultRecorded,
    ContactRelayOk,
    ContactRelayFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEventInput {
    pub schema_version: SchemaVersion,
    pub kind: AuditEventKind,
    pub reason_code: ReasonCodeId,
    pub t_event: MonotonicTimeNs,
    pub user_id: Option<UserId>,
    pub topic_id: Option<TopicId>,
    pub detail: Option<String>,
}

impl AuditEventInput {
    pub fn v1(
        kind: AuditEventKind,
        reason_code: ReasonCodeId,
        t_event: MonotonicTimeNs,
        user_id: Option<UserId>,
        topic_id: Option<TopicId>,
        detail: Option<String>,
    ) -> Result<Self, ContractViolation> {
        let i = Self {
            schema_version: AUDIT_CONTRACT_VERSION,
            kind,
            reason_code,
            t_event,
            user_id,
            topic_id,
            detail,
        };
        i.validate()?;
        Ok(i)
    }
}

impl Validate for AuditEventInput {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != AUDIT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "audit_event_input.schema_version",
                reason: "must match AUDIT_CONTRACT_VERSION",
            });
        }
        if self.reason_code.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "audit_event_input.reason_code",
                reason: "must be > 0",
            });
        }
        if let Some(user_id) = &self.user_id {
            user_id.validate()?;
        }
        if let Some(topic_id) = &self.topic_id {
            topic_id.validate()?;
        }
        if let Some(detail) = &self.detail {
            if detail.trim().is_empty() {
                return Err(ContractViolation::InvalidValue {
                    field: "audit_event_input.detail",
                    reason: "must not be empty when provided",
                });
            }
            if detail.len() > 256 {
                return Err(ContractViolation::InvalidValue {
                    field: "audit_event_input.detail",
                    reason: "must be <= 256 chars",
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub schema_version: SchemaVersion,
    pub event_id: AuditEventId,
    pub kind: AuditEventKind,
    pub reason_code: ReasonCodeId,
    pub t_event: MonotonicTimeNs,
    pub user_id: Option<UserId>,
    pub topic_id: Option<TopicId>,
    pub detail: Option<String>,
}

impl AuditEvent {
    pub fn from_input_v1(
        event_id: AuditEventId,
        input: AuditEventInput,
    ) -> Result<Self, ContractViolation> {
        event_id.validate()?;
        input.validate()?;
        Ok(Self {
            schema_version: AUDIT_CONTRACT_VERSION,
            event_id,
            kind: input.kind,
            reason_code: input.reason_code,
            t_event: input.t_event,
            user_id: input.user_id,
            topic_id: input.topic_id,
            detail: input.detail,
        })
    }
}
