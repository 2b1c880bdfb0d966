#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use pockets_contracts::access::{AccessDecision, TopicId, TopicPageView};
use pockets_contracts::audit::{AuditEventInput, AuditEventKind};
use pockets_contracts::session::UserSession;
use pockets_contracts::MonotonicTimeNs;
use pockets_storage::kv::KvSurface;
use pockets_storage::profile::{ProfileStore, StorageError};
use pockets_storage::trail::AuditTrail;

pub mod reason_codes {
    use pockets_contracts::ReasonCodeId;

    pub const ACCESS_GRANTED: ReasonCodeId = ReasonCodeId(0x4143_0001);
    pub const ACCESS_REFUSED_UNAUTHENTICATED: ReasonCodeId = ReasonCodeId(0x4143_0002);
    pub const ACCESS_REFUSED_UNPURCHASED: ReasonCodeId = ReasonCodeId(0x4143_0003);
}

/// The access rule, in full: no session means unauthenticated, a session
/// without the topic in the ledger means unpurchased, otherwise granted.
///
/// Pure over its snapshot arguments. Test results, roles and catalog
/// listings never enter the decision.
pub fn evaluate_topic_access(
    session: Option<&UserSession>,
    purchases: &BTreeSet<TopicId>,
    topic_id: &TopicId,
) -> AccessDecision {
    if session.is_none() {
        return AccessDecision::Unauthenticated;
    }
    if purchases.contains(topic_id) {
        AccessDecision::Granted(topic_id.clone())
    } else {
        AccessDecision::Unpurchased(topic_id.clone())
    }
}

/// Per-request gate in front of a topic page. Loads a fresh profile
/// snapshot, evaluates, writes one audit row, and hands the presentation
/// layer its page state.
#[derive(Debug, Default)]
pub struct TopicGate;

impl TopicGate {
    pub fn check<K: KvSurface>(
        store: &mut ProfileStore<K>,
        now: MonotonicTimeNs,
        topic_id: &TopicId,
    ) -> Result<TopicPageView, StorageError> {
        let session = store.load_session();
        let purchases = store.load_purchases();
        let decision = evaluate_topic_access(session.as_ref(), &purchases, topic_id);
        let (kind, reason_code) = match &decision {
            AccessDecision::Granted(_) => {
                (AuditEventKind::AccessGranted, reason_codes::ACCESS_GRANTED)
            }
            AccessDecision::Unauthenticated => (
                AuditEventKind::AccessRefused,
                reason_codes::ACCESS_REFUSED_UNAUTHENTICATED,
            ),
            AccessDecision::Unpurchased(_) => (
                AuditEventKind::AccessRefused,
                reason_codes::ACCESS_REFUSED_UNPURCHASED,
            ),
        };
        let input = AuditEventInput::v1(
            kind,
            reason_code,
            now,
            session.map(|s| s.user_id),
            Some(topic_id.clone()),
            None,
        )?;
        AuditTrail::emit(store, input)?;
        Ok(TopicPageView::from(decision))
    }
}
