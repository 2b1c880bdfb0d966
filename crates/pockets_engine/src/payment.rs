#![forbid(unsafe_code)]

use pockets_contracts::access::TopicId;
use pockets_contracts::audit::{AuditEventInput, AuditEventKind};
use pockets_contracts::catalog::listing_for;
use pockets_contracts::payment::{PurchaseFlowState, PurchaseTransition};
use pockets_contracts::{MonotonicTimeNs, ReasonCodeId};
use pockets_storage::kv::KvSurface;
use pockets_storage::profile::{ProfileStore, StorageError};
use pockets_storage::trail::AuditTrail;

pub mod reason_codes {
    use pockets_contracts::ReasonCodeId;

    pub const PURCHASE_SELECTED: ReasonCodeId = ReasonCodeId(0x5041_0001);
    pub const PURCHASE_CONFIRMED: ReasonCodeId = ReasonCodeId(0x5041_0002);
    pub const PURCHASE_COMPLETED: ReasonCodeId = ReasonCodeId(0x5041_0003);
    pub const PURCHASE_REFUSED_NOT_IDLE: ReasonCodeId = ReasonCodeId(0x5041_0004);
    pub const PURCHASE_REFUSED_UNAUTHENTICATED: ReasonCodeId = ReasonCodeId(0x5041_0005);
    pub const PURCHASE_REFUSED_UNKNOWN_TOPIC: ReasonCodeId = ReasonCodeId(0x5041_0006);
    pub const PURCHASE_REFUSED_NO_PENDING_TOPIC: ReasonCodeId = ReasonCodeId(0x5041_0007);
    pub const PURCHASE_REFUSED_NOT_AWAITING: ReasonCodeId = ReasonCodeId(0x5041_0008);
}

pub const PROCESSING_DELAY_MS_DEFAULT: u32 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseFlowConfig {
    pub processing_delay_ms: u32,
}

impl PurchaseFlowConfig {
    pub fn mvp_purchase_flow_v1() -> Self {
        Self {
            processing_delay_ms: PROCESSING_DELAY_MS_DEFAULT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FlowInner {
    Idle,
    AwaitingConfirmation { topic_id: TopicId },
    Processing { topic_id: TopicId, started_at: MonotonicTimeNs },
    Completed { topic_id: TopicId },
}

impl FlowInner {
    fn state(&self) -> PurchaseFlowState {
        match self {
            FlowInner::Idle => PurchaseFlowState::Idle,
            FlowInner::AwaitingConfirmation { .. } => PurchaseFlowState::AwaitingConfirmation,
            FlowInner::Processing { .. } => PurchaseFlowState::Processing,
            FlowInner::Completed { .. } => PurchaseFlowState::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseStepOutcome {
    /// The flow moved to a new state.
    Transitioned(PurchaseTransition),
    /// Nothing to do yet (or a repeated confirmation after completion).
    Held(PurchaseFlowState),
    /// The request was rejected and the flow did not move.
    Refused {
        reason_code: ReasonCodeId,
        message: String,
    },
}

/// Simulated purchase flow for one checkout at a time.
///
/// The flow only moves forward: select, confirm, then complete once the
/// processing delay has elapsed. There is no failure path and no
/// rollback past confirmation. Completion is the single point where the
/// purchase ledger grows; time only enters through the caller's `now`.
#[derive(Debug)]
pub struct PurchaseFlowRuntime {
    config: PurchaseFlowConfig,
    inner: FlowInner,
}

impl PurchaseFlowRuntime {
    pub fn new(config: PurchaseFlowConfig) -> Self {
        Self {
            config,
            inner: FlowInner::Idle,
        }
    }

    pub fn state(&self) -> PurchaseFlowState {
        self.inner.state()
    }

    pub fn selected_topic(&self) -> Option<&TopicId> {
        match &self.inner {
            FlowInner::Idle => None,
            FlowInner::AwaitingConfirmation { topic_id }
            | FlowInner::Processing { topic_id, .. }
            | FlowInner::Completed { topic_id } => Some(topic_id),
        }
    }

    /// Start a checkout for one catalog topic. Requires a signed-in
    /// profile; the selected topic is parked in the pending-payment key
    /// so a fresh runtime can pick the checkout back up.
    pub fn select<K: KvSurface>(
        &mut self,
        store: &mut ProfileStore<K>,
        now: MonotonicTimeNs,
        topic_id: &TopicId,
    ) -> Result<PurchaseStepOutcome, StorageError> {
        if self.inner != FlowInner::Idle {
            return Ok(refused(
                reason_codes::PURCHASE_REFUSED_NOT_IDLE,
                "a checkout is already underway",
            ));
        }
        if store.load_session().is_none() {
            return Ok(refused(
                reason_codes::PURCHASE_REFUSED_UNAUTHENTICATED,
                "sign in before purchasing",
            ));
        }
        if listing_for(topic_id).is_none() {
            return Ok(refused(
                reason_codes::PURCHASE_REFUSED_UNKNOWN_TOPIC,
                "unknown topic",
            ));
        }
        store.set_pending_topic(topic_id)?;
        let transition = PurchaseTransition::v1(
            PurchaseFlowState::Idle,
            PurchaseFlowState::AwaitingConfirmation,
            topic_id.clone(),
            reason_codes::PURCHASE_SELECTED,
            now,
        )?;
        self.inner = FlowInner::AwaitingConfirmation {
            topic_id: topic_id.clone(),
        };
        Ok(PurchaseStepOutcome::Transitioned(transition))
    }

    /// Rebuild an awaiting checkout from the pending-payment key, as when
    /// the payment page is opened in a fresh context.
    pub fn resume_from_pending<K: KvSurface>(
        &mut self,
        store: &ProfileStore<K>,
        now: MonotonicTimeNs,
    ) -> Result<PurchaseStepOutcome, StorageError> {
        if self.inner != FlowInner::Idle {
            return Ok(refused(
                reason_codes::PURCHASE_REFUSED_NOT_IDLE,
                "a checkout is already underway",
            ));
        }
        if store.load_session().is_none() {
            return Ok(refused(
                reason_codes::PURCHASE_REFUSED_UNAUTHENTICATED,
                "sign in before purchasing",
            ));
        }
        let Some(topic_id) = store.peek_pending_topic() else {
            return Ok(refused(
                reason_codes::PURCHASE_REFUSED_NO_PENDING_TOPIC,
                "no topic is awaiting payment",
            ));
        };
        let transition = PurchaseTransition::v1(
            PurchaseFlowState::Idle,
            PurchaseFlowState::AwaitingConfirmation,
            topic_id.clone(),
            reason_codes::PURCHASE_SELECTED,
            now,
        )?;
        self.inner = FlowInner::AwaitingConfirmation { topic_id };
        Ok(PurchaseStepOutcome::Transitioned(transition))
    }

    /// The buyer pressed pay. Moves the flow into its processing window;
    /// confirming an already-completed checkout holds without effect.
    pub fn confirm(&mut self, now: MonotonicTimeNs) -> Result<PurchaseStepOutcome, StorageError> {
        match &self.inner {
            FlowInner::AwaitingConfirmation { topic_id } => {
                let topic_id = topic_id.clone();
                let transition = PurchaseTransition::v1(
                    PurchaseFlowState::AwaitingConfirmation,
                    PurchaseFlowState::Processing,
                    topic_id.clone(),
                    reason_codes::PURCHASE_CONFIRMED,
                    now,
                )?;
                self.inner = FlowInner::Processing {
                    topic_id,
                    started_at: now,
                };
                Ok(PurchaseStepOutcome::Transitioned(transition))
            }
            FlowInner::Completed { .. } => Ok(PurchaseStepOutcome::Held(PurchaseFlowState::Completed)),
            _ => Ok(refused(
                reason_codes::PURCHASE_REFUSED_NOT_AWAITING,
                "nothing to confirm",
            )),
        }
    }

    /// Drive the deferred completion. Once the processing delay has
    /// elapsed the purchase is appended to the ledger, the pending key is
    /// consumed, and one audit row is written.
    pub fn poll<K: KvSurface>(
        &mut self,
        store: &mut ProfileStore<K>,
        now: MonotonicTimeNs,
    ) -> Result<PurchaseStepOutcome, StorageError> {
        let FlowInner::Processing {
            topic_id,
            started_at,
        } = &self.inner
        else {
            return Ok(PurchaseStepOutcome::Held(self.state()));
        };
        let elapsed_ns = now.0.saturating_sub(started_at.0);
        if elapsed_ns < ms_to_ns(self.config.processing_delay_ms) {
            return Ok(PurchaseStepOutcome::Held(PurchaseFlowState::Processing));
        }
        let topic_id = topic_id.clone();
        // Re-purchase of an already-owned topic is a no-op append.
        store.add_purchase(&topic_id)?;
        store.take_pending_topic();
        let user_id = store.load_session().map(|s| s.user_id);
        let input = AuditEventInput::v1(
            AuditEventKind::PurchaseRecorded,
            reason_codes::PURCHASE_COMPLETED,
            now,
            user_id,
            Some(topic_id.clone()),
            None,
        )?;
        AuditTrail::emit(store, input)?;
        let transition = PurchaseTransition::v1(
            PurchaseFlowState::Processing,
            PurchaseFlowState::Completed,
            topic_id.clone(),
            reason_codes::PURCHASE_COMPLETED,
            now,
        )?;
        self.inner = FlowInner::Completed { topic_id };
        Ok(PurchaseStepOutcome::Transitioned(transition))
    }
}

impl Default for PurchaseFlowRuntime {
    fn default() -> Self {
        Self::new(PurchaseFlowConfig::mvp_purchase_flow_v1())
    }
}

fn refused(reason_code: ReasonCodeId, message: &str) -> PurchaseStepOutcome {
    PurchaseStepOutcome::Refused {
        reason_code,
        message: message.to_string(),
    }
}

fn ms_to_ns(ms: u32) -> u64 {
    ms as u64 * 1_000_000
}
