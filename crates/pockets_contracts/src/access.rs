#![forbid(unsafe_code)]

use crate::common::validate_id;
use crate::{ContractViolation, SchemaVersion, Validate};

pub const ACCESS_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// Identifier of a purchasable course topic ("1".."5" in the shipped catalog).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicId(String);

impl TopicId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let id = id.into();
        let v = Self(id);
        v.validate()?;
        Ok(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for TopicId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_id("topic_id", &self.0, 16)
    }
}

/// Tri-state access decision for one topic against the current profile
/// snapshot. Derived, never persisted; recomputed on every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Unauthenticated,
    Unpurchased(TopicId),
    Granted(TopicId),
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted(_))
    }
}

/// The three page states the presentation layer renders. Presentation is
/// an external collaborator; this enum is the whole boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicPageView {
    AuthRequired,
    PurchaseRequired(TopicId),
    TopicContent(TopicId),
}

impl From<AccessDecision> for TopicPageView {
    fn from(decision: AccessDecision) -> Self {
        match decision {
            AccessDecision::Unauthenticated => TopicPageView::AuthRequired,
            AccessDecision::Unpurchased(topic_id) => TopicPageView::PurchaseRequired(topic_id),
            AccessDecision::Granted(topic_id) => TopicPageView::TopicContent(topic_id),
        }
    }
}
