#![forbid(unsafe_code)]

use crate::{ContractViolation, SchemaVersion, Validate};

pub const CONTACT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// Strip everything but digits and `+`, as the source does before
/// pattern-checking.
pub fn normalized_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Russian mobile/landline check from the source form: an optional
/// `+7`/`7`/`8` prefix followed by ten digits whose first digit is 4, 8
/// or 9.
pub fn is_valid_russian_phone(phone: &str) -> bool {
    let clean = normalized_phone(phone);
    let digits = if let Some(rest) = clean.strip_prefix("+7") {
        rest
    } else if (clean.starts_with('7') || clean.starts_with('8')) && clean.len() == 11 {
        &clean[1..]
    } else {
        clean.as_str()
    };
    digits.len() == 10
        && digits.chars().all(|c| c.is_ascii_digit())
        && matches!(digits.as_bytes()[0], b'4' | b'8' | b'9')
}

/// One submission of the contact-intake form. The message is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub schema_version: SchemaVersion,
    pub name: String,
    pub phone: String,
    pub message: String,
}

impl ContactRequest {
    pub fn v1(
        name: String,
        phone: String,
        message: String,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: CONTACT_CONTRACT_VERSION,
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            message: message.trim().to_string(),
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for ContactRequest {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != CONTACT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "contact_request.schema_version",
                reason: "must match CONTACT_CONTRACT_VERSION",
            });
        }
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "contact_request.name",
                reason: "must not be empty",
            });
        }
        if name.chars().count() < 2 {
            return Err(ContractViolation::InvalidValue {
                field: "contact_request.name",
                reason: "must be >= 2 chars",
            });
        }
        if self.name.len() > 128 {
            return Err(ContractViolation::InvalidValue {
                field: "contact_request.name",
                reason: "must be <= 128 chars",
            });
        }
        if self.phone.trim().is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "contact_request.phone",
                reason: "must not be empty",
            });
        }
        if !is_valid_russian_phone(&self.phone) {
            return Err(ContractViolation::InvalidValue {
                field: "contact_request.phone",
                reason: "must be a valid phone number",
            });
        }
        if self.message.len() > 2000 {
            return Err(ContractViolation::InvalidValue {
                field: "contact_request.message",
                reason: "must be <= 2000 chars",
            });
        }
        Ok(())
    }
}

/// Wire shape of the intake endpoint's JSON reply:
/// `{success: bool, message?, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContactOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
