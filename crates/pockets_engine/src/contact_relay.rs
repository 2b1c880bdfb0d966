#![forbid(unsafe_code)]

use std::env;
use std::time::Duration;

use pockets_contracts::audit::{AuditEventInput, AuditEventKind};
use pockets_contracts::contact::{ContactOutcome, ContactRequest};
use pockets_contracts::{MonotonicTimeNs, Validate};
use pockets_storage::kv::KvSurface;
use pockets_storage::profile::{ProfileStore, StorageError};
use pockets_storage::trail::AuditTrail;

pub mod reason_codes {
    use pockets_contracts::ReasonCodeId;

    pub const CONTACT_RELAY_OK: ReasonCodeId = ReasonCodeId(0x434E_0001);
    pub const CONTACT_RELAY_FAILED: ReasonCodeId = ReasonCodeId(0x434E_0002);
}

pub const CONTACT_CONNECT_TIMEOUT_MS_DEFAULT: u64 = 3_000;
pub const CONTACT_REQUEST_TIMEOUT_MS_DEFAULT: u64 = 10_000;

/// Wire shape of one intake submission.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
struct ContactEnvelope {
    name: String,
    phone: String,
    message: String,
}

impl ContactEnvelope {
    fn from_request(request: &ContactRequest) -> Self {
        Self {
            name: request.name.clone(),
            phone: request.phone.clone(),
            message: request.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSendReceipt {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSendError {
    pub message: String,
}

impl ContactSendError {
    fn new(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.len() > 256 {
            // Back off to a char boundary so multi-byte error text from
            // the intake endpoint cannot split a codepoint.
            let mut end = 256;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }
        Self { message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactHttpSenderConfig {
    pub endpoint: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl ContactHttpSenderConfig {
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("POCKETS_CONTACT_ENDPOINT").ok()?;
        let endpoint = endpoint.trim().to_string();
        if endpoint.is_empty() {
            return None;
        }
        let connect_timeout_ms = env::var("POCKETS_CONTACT_CONNECT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| (100..=60_000).contains(v))
            .unwrap_or(CONTACT_CONNECT_TIMEOUT_MS_DEFAULT);
        let request_timeout_ms = env::var("POCKETS_CONTACT_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| (100..=120_000).contains(v))
            .unwrap_or(CONTACT_REQUEST_TIMEOUT_MS_DEFAULT);
        Some(Self {
            endpoint,
            connect_timeout_ms,
            request_timeout_ms,
        })
    }
}

/// The one outward-facing edge of the system: a single-attempt POST to
/// the contact-intake endpoint. No retries and no queue; a failed send
/// is reported back to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactSenderRuntime {
    /// Accept every submission locally. Used when no endpoint is configured.
    LoopbackAck,
    Http(ContactHttpSenderConfig),
    #[cfg(test)]
    AlwaysFail { message: String },
}

impl Default for ContactSenderRuntime {
    fn default() -> Self {
        Self::from_env_or_loopback()
    }
}

impl ContactSenderRuntime {
    pub fn from_env_or_loopback() -> Self {
        if let Some(config) = ContactHttpSenderConfig::from_env() {
            return Self::Http(config);
        }
        Self::LoopbackAck
    }

    #[cfg(test)]
    pub fn always_fail_for_tests(message: impl Into<String>) -> Self {
        Self::AlwaysFail {
            message: message.into(),
        }
    }

    pub fn send(&self, request: &ContactRequest) -> Result<ContactSendReceipt, ContactSendError> {
        if let Err(violation) = request.validate() {
            return Err(ContactSendError::new(format!(
                "contact request invalid: {:?}",
                violation
            )));
        }
        match self {
            ContactSenderRuntime::LoopbackAck => Ok(ContactSendReceipt { message: None }),
            ContactSenderRuntime::Http(config) => send_http(config, request),
            #[cfg(test)]
            ContactSenderRuntime::AlwaysFail { message } => {
                Err(ContactSendError::new(message.clone()))
            }
        }
    }
}

fn send_http(
    config: &ContactHttpSenderConfig,
    request: &ContactRequest,
) -> Result<ContactSendReceipt, ContactSendError> {
    let envelope = ContactEnvelope::from_request(request);
    let payload = serde_json::to_string(&envelope)
        .map_err(|err| ContactSendError::new(format!("contact payload encode failed: {}", err)))?;
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_millis(config.connect_timeout_ms))
        .timeout_read(Duration::from_millis(config.request_timeout_ms))
        .timeout_write(Duration::from_millis(config.request_timeout_ms))
        .build();
    let req = agent
        .post(&config.endpoint)
        .set("content-type", "application/json");
    match req.send_string(&payload) {
        Ok(resp) => {
            if !(200..=299).contains(&resp.status()) {
                return Err(ContactSendError::new(format!(
                    "contact intake replied with http status {}",
                    resp.status()
                )));
            }
            let body = resp
                .into_string()
                .map_err(|err| ContactSendError::new(format!("contact reply read failed: {}", err)))?;
            let outcome: ContactOutcome = serde_json::from_str(&body).map_err(|err| {
                ContactSendError::new(format!("contact reply decode failed: {}", err))
            })?;
            if outcome.success {
                Ok(ContactSendReceipt {
                    message: outcome.message,
                })
            } else {
                Err(ContactSendError::new(
                    outcome
                        .error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| "contact intake rejected the submission".to_string()),
                ))
            }
        }
        Err(ureq::Error::Status(code, _)) => Err(ContactSendError::new(format!(
            "contact intake replied with http status {}",
            code
        ))),
        Err(ureq::Error::Transport(err)) => Err(ContactSendError::new(format!(
            "contact transport error: {}",
            err
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRelayReport {
    pub audit_event_id: pockets_contracts::audit::AuditEventId,
    pub outcome: Result<ContactSendReceipt, ContactSendError>,
}

/// Relay one contact submission through the configured sender and record
/// the attempt. Exactly one audit row per call, success or not.
pub fn relay_contact<K: KvSurface>(
    store: &mut ProfileStore<K>,
    now: MonotonicTimeNs,
    sender: &ContactSenderRuntime,
    request: &ContactRequest,
) -> Result<ContactRelayReport, StorageError> {
    let outcome = sender.send(request);
    let user_id = store.load_session().map(|s| s.user_id);
    let (kind, reason_code, detail) = match &outcome {
        Ok(_) => (
            AuditEventKind::ContactRelayOk,
            reason_codes::CONTACT_RELAY_OK,
            None,
        ),
        Err(err) => (
            AuditEventKind::ContactRelayFailed,
            reason_codes::CONTACT_RELAY_FAILED,
            // Blank failure text would be rejected by the audit contract.
            (!err.message.trim().is_empty()).then(|| err.message.clone()),
        ),
    };
    let input = AuditEventInput::v1(kind, reason_code, now, user_id, None, detail)?;
    let audit_event_id = AuditTrail::emit(store, input)?;
    Ok(ContactRelayReport {
        audit_event_id,
        outcome,
    })
}
