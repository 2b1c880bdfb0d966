#![forbid(unsafe_code)]

use crate::access::TopicId;
use crate::common::validate_text;
use crate::{ContractViolation, SchemaVersion, Validate};

pub const CATALOG_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const TOPIC_PRICE_RUB_DEFAULT: u32 = 299;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriceRub(pub u32);

impl Validate for PriceRub {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "price_rub",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicListing {
    pub schema_version: SchemaVersion,
    pub topic_id: TopicId,
    pub title: String,
    pub description: String,
    pub price_rub: PriceRub,
}

impl TopicListing {
    pub fn v1(
        topic_id: TopicId,
        title: String,
        description: String,
        price_rub: PriceRub,
    ) -> Result<Self, ContractViolation> {
        let l = Self {
            schema_version: CATALOG_CONTRACT_VERSION,
            topic_id,
            title,
            description,
            price_rub,
        };
        l.validate()?;
        Ok(l)
    }
}

impl Validate for TopicListing {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != CATALOG_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "topic_listing.schema_version",
                reason: "must match CATALOG_CONTRACT_VERSION",
            });
        }
        self.topic_id.validate()?;
        validate_text("topic_listing.title", &self.title, 96)?;
        validate_text("topic_listing.description", &self.description, 256)?;
        self.price_rub.validate()?;
        Ok(())
    }
}

/// The five shipped mini-course topics.
pub fn builtin_catalog() -> Vec<TopicListing> {
    let entries: [(&str, &str, &str); 5] = [
        ("1", "Present Simple", "The present simple tense, the backbone of English grammar"),
        ("2", "Past Simple", "The past simple tense for talking about the past"),
        ("3", "Future Simple", "The future simple tense for making plans"),
        ("4", "Present Continuous", "The present continuous tense for actions in progress"),
        ("5", "Modal Verbs", "Modal verbs for ability, permission and necessity"),
    ];
    entries
        .iter()
        .map(|(id, title, description)| {
            TopicListing {
                schema_version: CATALOG_CONTRACT_VERSION,
                // Static table; ids and texts are known-valid.
                topic_id: TopicId::new(*id).expect("builtin topic id"),
                title: (*title).to_string(),
                description: (*description).to_string(),
                price_rub: PriceRub(TOPIC_PRICE_RUB_DEFAULT),
            }
        })
        .collect()
}

pub fn listing_for(topic_id: &TopicId) -> Option<TopicListing> {
    builtin_catalog()
        .into_iter()
        .find(|l| &l.topic_id == topic_id)
}

fn topic_ordinal(topic_id: &TopicId) -> Option<u32> {
    topic_id.as_str().parse::<u32>().ok()
}

fn topic_from_ordinal(ordinal: u32) -> Option<TopicId> {
    let candidate = TopicId::new(ordinal.to_string()).ok()?;
    listing_for(&candidate).map(|_| candidate)
}

/// Next topic in catalog order, None at the last one.
pub fn next_topic(topic_id: &TopicId) -> Option<TopicId> {
    topic_from_ordinal(topic_ordinal(topic_id)?.checked_add(1)?)
}

/// Previous topic in catalog order, None at the first one.
pub fn previous_topic(topic_id: &TopicId) -> Option<TopicId> {
    topic_from_ordinal(topic_ordinal(topic_id)?.checked_sub(1)?)
}
