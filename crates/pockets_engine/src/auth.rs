#![forbid(unsafe_code)]

use pockets_contracts::audit::{AuditEventInput, AuditEventKind};
use pockets_contracts::session::{
    is_well_formed_email, is_well_formed_login_handle, UserId, UserRole, UserSession,
    TEST_ACCOUNT_HANDLE,
};
use pockets_contracts::{MonotonicTimeNs, ReasonCodeId};
use pockets_storage::kv::KvSurface;
use pockets_storage::profile::{ProfileStore, StorageError};
use pockets_storage::trail::AuditTrail;

pub mod reason_codes {
    use pockets_contracts::ReasonCodeId;

    pub const LOGIN_OK: ReasonCodeId = ReasonCodeId(0x4155_0001);
    pub const LOGIN_REFUSED_MALFORMED_HANDLE: ReasonCodeId = ReasonCodeId(0x4155_0002);
    pub const LOGIN_REFUSED_EMPTY_PASSWORD: ReasonCodeId = ReasonCodeId(0x4155_0003);
    pub const LOGIN_REFUSED_BAD_CREDENTIALS: ReasonCodeId = ReasonCodeId(0x4155_0004);
    pub const REGISTER_OK: ReasonCodeId = ReasonCodeId(0x4155_0005);
    pub const REGISTER_REFUSED_EMPTY_NAME: ReasonCodeId = ReasonCodeId(0x4155_0006);
    pub const REGISTER_REFUSED_MALFORMED_EMAIL: ReasonCodeId = ReasonCodeId(0x4155_0007);
    pub const REGISTER_REFUSED_SHORT_PASSWORD: ReasonCodeId = ReasonCodeId(0x4155_0008);
    pub const REGISTER_REFUSED_CONFIRM_MISMATCH: ReasonCodeId = ReasonCodeId(0x4155_0009);
    pub const FORGOT_PASSWORD_OK: ReasonCodeId = ReasonCodeId(0x4155_000A);
    pub const FORGOT_PASSWORD_REFUSED_MALFORMED_EMAIL: ReasonCodeId = ReasonCodeId(0x4155_000B);
    pub const LOGOUT_OK: ReasonCodeId = ReasonCodeId(0x4155_000C);
}

pub const PASSWORD_MIN_CHARS: usize = 6;

/// The one accepted password for the built-in test account.
const TEST_ACCOUNT_PASSWORD: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthConfig {
    /// When set, logout also unlinks the purchase ledger. The shipped
    /// product keeps the ledger across sign-outs, so this defaults off.
    pub clear_purchases_on_logout: bool,
}

impl AuthConfig {
    pub fn mvp_auth_v1() -> Self {
        Self {
            clear_purchases_on_logout: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Login {
        email: String,
        password: String,
    },
    Register {
        name: String,
        email: String,
        password: String,
        password_confirm: String,
    },
    TestAccount,
    ForgotPassword {
        email: String,
    },
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOk {
    pub reason_code: ReasonCodeId,
    pub session: Option<UserSession>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRefuse {
    pub reason_code: ReasonCodeId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResponse {
    Ok(AuthOk),
    Refuse(AuthRefuse),
}

impl AuthResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, AuthResponse::Ok(_))
    }
}

/// Deterministic auth runtime over one profile store.
///
/// There is no credential database: login accepts exactly the built-in
/// test account, and registration signs the new identity straight in.
/// Every accepted or refused request leaves one audit row.
#[derive(Debug)]
pub struct AuthRuntime {
    config: AuthConfig,
}

impl AuthRuntime {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn run<K: KvSurface>(
        &self,
        store: &mut ProfileStore<K>,
        now: MonotonicTimeNs,
        request: &AuthRequest,
    ) -> Result<AuthResponse, StorageError> {
        match request {
            AuthRequest::Login { email, password } => self.login(store, now, email, password),
            AuthRequest::Register {
                name,
                email,
                password,
                password_confirm,
            } => self.register(store, now, name, email, password, password_confirm),
            AuthRequest::TestAccount => {
                self.login(store, now, TEST_ACCOUNT_HANDLE, TEST_ACCOUNT_PASSWORD)
            }
            AuthRequest::ForgotPassword { email } => self.forgot_password(store, now, email),
            AuthRequest::Logout => self.logout(store, now),
        }
    }

    fn login<K: KvSurface>(
        &self,
        store: &mut ProfileStore<K>,
        now: MonotonicTimeNs,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, StorageError> {
        let email = email.trim();
        if !is_well_formed_login_handle(email) {
            return refuse_login(
                store,
                now,
                reason_codes::LOGIN_REFUSED_MALFORMED_HANDLE,
                "enter a valid email address",
            );
        }
        if password.is_empty() {
            return refuse_login(
                store,
                now,
                reason_codes::LOGIN_REFUSED_EMPTY_PASSWORD,
                "enter your password",
            );
        }
        if email != TEST_ACCOUNT_HANDLE || password != TEST_ACCOUNT_PASSWORD {
            return refuse_login(
                store,
                now,
                reason_codes::LOGIN_REFUSED_BAD_CREDENTIALS,
                "invalid email or password",
            );
        }
        let session = UserSession::test_account_v1(now)?;
        store.save_session(&session)?;
        let input = AuditEventInput::v1(
            AuditEventKind::LoginOk,
            reason_codes::LOGIN_OK,
            now,
            Some(session.user_id.clone()),
            None,
            None,
        )?;
        AuditTrail::emit(store, input)?;
        Ok(AuthResponse::Ok(AuthOk {
            reason_code: reason_codes::LOGIN_OK,
            session: Some(session),
            message: "signed in".to_string(),
        }))
    }

    fn register<K: KvSurface>(
        &self,
        store: &mut ProfileStore<K>,
        now: MonotonicTimeNs,
        name: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<AuthResponse, StorageError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return refuse_register(
                store,
                now,
                reason_codes::REGISTER_REFUSED_EMPTY_NAME,
                "enter your name",
            );
        }
        if !is_well_formed_email(email) {
            return refuse_register(
                store,
                now,
                reason_codes::REGISTER_REFUSED_MALFORMED_EMAIL,
                "enter a valid email address",
            );
        }
        if password.chars().count() < PASSWORD_MIN_CHARS {
            return refuse_register(
                store,
                now,
                reason_codes::REGISTER_REFUSED_SHORT_PASSWORD,
                "password must be at least 6 characters",
            );
        }
        if password != password_confirm {
            return refuse_register(
                store,
                now,
                reason_codes::REGISTER_REFUSED_CONFIRM_MISMATCH,
                "passwords do not match",
            );
        }
        // The source derives the new account id from the clock.
        let user_id = UserId::new(now.0.to_string())?;
        let session = UserSession::v1(
            user_id,
            name.to_string(),
            email.to_string(),
            UserRole::User,
            now,
        )?;
        store.save_session(&session)?;
        let input = AuditEventInput::v1(
            AuditEventKind::RegisterOk,
            reason_codes::REGISTER_OK,
            now,
            Some(session.user_id.clone()),
            None,
            None,
        )?;
        AuditTrail::emit(store, input)?;
        Ok(AuthResponse::Ok(AuthOk {
            reason_code: reason_codes::REGISTER_OK,
            session: Some(session),
            message: "account created".to_string(),
        }))
    }

    fn forgot_password<K: KvSurface>(
        &self,
        store: &mut ProfileStore<K>,
        now: MonotonicTimeNs,
        email: &str,
    ) -> Result<AuthResponse, StorageError> {
        let email = email.trim();
        if !is_well_formed_email(email) {
            return refuse_login(
                store,
                now,
                reason_codes::FORGOT_PASSWORD_REFUSED_MALFORMED_EMAIL,
                "enter a valid email address",
            );
        }
        // Simulated: no mail is sent and no state changes.
        Ok(AuthResponse::Ok(AuthOk {
            reason_code: reason_codes::FORGOT_PASSWORD_OK,
            session: None,
            message: "password reset instructions sent".to_string(),
        }))
    }

    fn logout<K: KvSurface>(
        &self,
        store: &mut ProfileStore<K>,
        now: MonotonicTimeNs,
    ) -> Result<AuthResponse, StorageError> {
        let user_id = store.load_session().map(|s| s.user_id);
        store.clear_session();
        if self.config.clear_purchases_on_logout {
            store.clear_purchases();
        }
        let input = AuditEventInput::v1(
            AuditEventKind::Logout,
            reason_codes::LOGOUT_OK,
            now,
            user_id,
            None,
            None,
        )?;
        AuditTrail::emit(store, input)?;
        Ok(AuthResponse::Ok(AuthOk {
            reason_code: reason_codes::LOGOUT_OK,
            session: None,
            message: "signed out".to_string(),
        }))
    }
}

impl Default for AuthRuntime {
    fn default() -> Self {
        Self::new(AuthConfig::mvp_auth_v1())
    }
}

fn refuse_login<K: KvSurface>(
    store: &mut ProfileStore<K>,
    now: MonotonicTimeNs,
    reason_code: ReasonCodeId,
    message: &str,
) -> Result<AuthResponse, StorageError> {
    let input = AuditEventInput::v1(
        AuditEventKind::LoginRefused,
        reason_code,
        now,
        None,
        None,
        None,
    )?;
    AuditTrail::emit(store, input)?;
    Ok(AuthResponse::Refuse(AuthRefuse {
        reason_code,
        message: message.to_string(),
    }))
}

fn refuse_register<K: KvSurface>(
    store: &mut ProfileStore<K>,
    now: MonotonicTimeNs,
    reason_code: ReasonCodeId,
    message: &str,
) -> Result<AuthResponse, StorageError> {
    let input = AuditEventInput::v1(
        AuditEventKind::RegisterRefused,
        reason_code,
        now,
        None,
        None,
        None,
    )?;
    AuditTrail::emit(store, input)?;
    Ok(AuthResponse::Refuse(AuthRefuse {
        reason_code,
        message: message.to_string(),
    }))
}
