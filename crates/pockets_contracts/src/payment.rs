#![forbid(unsafe_code)]

use crate::access::TopicId;
use crate::{ContractViolation, MonotonicTimeNs, ReasonCodeId, SchemaVersion, Validate};

pub const PAYMENT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// Simulated purchase flow states, per topic. The flow has no failure
/// path past confirmation and no rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PurchaseFlowState {
    Idle,
    AwaitingConfirmation,
    Processing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseTransition {
    pub schema_version: SchemaVersion,
    pub from: PurchaseFlowState,
    pub to: PurchaseFlowState,
    pub topic_id: TopicId,
    pub reason_code: ReasonCodeId,
    pub t_event: MonotonicTimeNs,
}

impl PurchaseTransition {
    pub fn v1(
        from: PurchaseFlowState,
        to: PurchaseFlowState,
        topic_id: TopicId,
        reason_code: ReasonCodeId,
        t_event: MonotonicTimeNs,
    ) -> Result<Self, ContractViolation> {
        let t = Self {
            schema_version: PAYMENT_CONTRACT_VERSION,
            from,
            to,
            topic_id,
            reason_code,
            t_event,
        };
        t.validate()?;
        Ok(t)
    }
}

impl Validate for PurchaseTransition {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != PAYMENT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "purchase_transition.schema_version",
                reason: "must match PAYMENT_CONTRACT_VERSION",
            });
        }
        if self.from == self.to {
            return Err(ContractViolation::InvalidValue {
                field: "purchase_transition.to",
                reason: "must differ from the source state",
            });
        }
        self.topic_id.validate()?;
        if self.reason_code.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "purchase_transition.reason_code",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}
