#![forbid(unsafe_code)]

use crate::common::{validate_id, validate_text};
use crate::{ContractViolation, MonotonicTimeNs, SchemaVersion, Validate};

pub const SESSION_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// The built-in simulated account. Not a real credential system: the
/// browser profile only ever knew this one login.
pub const TEST_ACCOUNT_HANDLE: &str = "admin";
pub const TEST_ACCOUNT_DISPLAY_NAME: &str = "Administrator";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl UserId {
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

impl Validate for UserId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_id("user_id", &self.0, 64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn label(self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Matches the source pattern `^[^\s@]+@[^\s@]+\.[^\s@]+$`: a non-empty
/// local part, exactly one `@`, and a dot inside the domain with text on
/// both sides.
pub fn is_well_formed_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = s.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// A login handle is either a well-formed email or the built-in test handle.
pub fn is_well_formed_login_handle(s: &str) -> bool {
    s == TEST_ACCOUNT_HANDLE || is_well_formed_email(s)
}

/// The singleton per-profile identity record. Overwritten on re-login,
/// removed on logout; never partially merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub schema_version: SchemaVersion,
    pub user_id: UserId,
    pub display_name: String,
    pub login_email: String,
    pub role: UserRole,
    pub created_at: MonotonicTimeNs,
}

impl UserSession {
    pub fn v1(
        user_id: UserId,
        display_name: String,
        login_email: String,
        role: UserRole,
        created_at: MonotonicTimeNs,
    ) -> Result<Self, ContractViolation> {
        let s = Self {
            schema_version: SESSION_CONTRACT_VERSION,
            user_id,
            display_name,
            login_email,
            role,
            created_at,
        };
        s.validate()?;
        Ok(s)
    }

    pub fn test_account_v1(created_at: MonotonicTimeNs) -> Result<Self, ContractViolation> {
        Self::v1(
            UserId::new(TEST_ACCOUNT_HANDLE)?,
            TEST_ACCOUNT_DISPLAY_NAME.to_string(),
            TEST_ACCOUNT_HANDLE.to_string(),
            UserRole::Admin,
            created_at,
        )
    }
}

impl Validate for UserSession {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != SESSION_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "user_session.schema_version",
                reason: "must match SESSION_CONTRACT_VERSION",
            });
        }
        self.user_id.validate()?;
        validate_text("user_session.display_name", &self.display_name, 128)?;
        if self.login_email.len() > 128 {
            return Err(ContractViolation::InvalidValue {
                field: "user_session.login_email",
                reason: "must be <= 128 chars",
            });
        }
        if !is_well_formed_login_handle(&self.login_email) {
            return Err(ContractViolation::InvalidValue {
                field: "user_session.login_email",
                reason: "must be a well-formed email or the test handle",
            });
        }
        Ok(())
    }
}
