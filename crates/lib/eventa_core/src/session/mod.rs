// @awa-component: AUTH-SessionResolver
//
//! Session resolver, the single source of truth for "who is logged in".
//!
//! The credential lives in the [`ClientStore`]; the role flags come from the
//! backend's current-user endpoint. Every check follows the same contract:
//!
//! - no token → unauthenticated
//! - token + admin/organizer user → authenticated
//! - token + plain user → token erased, unauthenticated
//! - token + any failure → token erased, unauthenticated
//!
//! Screens and the route gate read [`Session::state`] or subscribe to it;
//! none of them re-implement the resolution.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::backend::{ApiError, AuthBackend};
use crate::models::{CurrentUser, RoleSet};
use crate::store::{ClientStore, TOKEN_KEY, USER_KEY};

/// Default re-validation period.
pub const DEFAULT_REVALIDATE_INTERVAL: Duration = Duration::from_secs(10);

const STORAGE_WARNING: &str =
    "persistent storage is unavailable; this session will end when the process exits";

/// Session errors surfaced by `login`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Login failed: {0}")]
    InvalidCredentials(String),

    #[error("Access denied: {0} is neither an admin nor an organizer")]
    AccessDenied(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Resolution in flight; no navigation decisions yet.
    Loading,
    Unauthenticated { reason: Option<String> },
    Authenticated { user: CurrentUser },
}

impl SessionState {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            SessionState::Authenticated { user } => Some(user),
            _ => None,
        }
    }

    /// Role flags; both `false` unless authenticated.
    pub fn roles(&self) -> RoleSet {
        self.user().map(CurrentUser::roles).unwrap_or_default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: CurrentUser,
    /// Set when the token could only be kept in memory.
    pub storage_warning: Option<String>,
}

pub struct Session<B> {
    backend: B,
    store: Arc<ClientStore>,
    state: watch::Sender<SessionState>,
}

impl<B: AuthBackend> Session<B> {
    pub fn new(backend: B, store: Arc<ClientStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            backend,
            store,
            state,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &Arc<ClientStore> {
        &self.store
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Initial check on startup. Same contract as [`Session::refresh`].
    pub async fn resolve(&self) -> SessionState {
        self.refresh().await
    }

    /// Re-check the stored credential against the backend.
    ///
    /// If the stored token changes while the check is in flight (logout or
    /// a new login), the result is discarded.
    pub async fn refresh(&self) -> SessionState {
        let Some(token) = self.store.get_item(TOKEN_KEY) else {
            self.store.remove_item(USER_KEY);
            return self.publish(SessionState::Unauthenticated { reason: None });
        };

        let result = self.backend.current_user().await;

        if self.store.get_item(TOKEN_KEY).as_deref() != Some(token.as_str()) {
            debug!("credential changed during session check, discarding result");
            return self.state();
        }

        match result {
            Ok(user) if user.roles().is_permitted() => {
                self.cache_user(&user);
                self.publish(SessionState::Authenticated { user })
            }
            Ok(user) => {
                warn!("{} has no admin or organizer role, signing out", user.email);
                self.clear_credentials();
                self.publish(SessionState::Unauthenticated {
                    reason: Some(format!(
                        "{} is neither an admin nor an organizer",
                        user.email
                    )),
                })
            }
            Err(e) => {
                warn!("session check failed, signing out: {e}");
                self.clear_credentials();
                self.publish(SessionState::Unauthenticated {
                    reason: Some(e.to_string()),
                })
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        let response = match self.backend.login(email, password).await {
            Ok(r) => r,
            Err(e) => {
                self.clear_credentials();
                self.publish(SessionState::Unauthenticated {
                    reason: Some(e.to_string()),
                });
                return Err(match e {
                    ApiError::Unauthorized(m) | ApiError::Status { status: 400, message: m } => {
                        SessionError::InvalidCredentials(m)
                    }
                    other => SessionError::Api(other),
                });
            }
        };

        let storage_warning = if self.store.set_item(TOKEN_KEY, &response.token).is_durable() {
            None
        } else {
            warn!("{STORAGE_WARNING}");
            Some(STORAGE_WARNING.to_string())
        };

        let user = match self.backend.current_user().await {
            Ok(user) => user,
            Err(e) => {
                self.clear_credentials();
                self.publish(SessionState::Unauthenticated {
                    reason: Some(e.to_string()),
                });
                return Err(e.into());
            }
        };

        if !user.roles().is_permitted() {
            self.clear_credentials();
            self.publish(SessionState::Unauthenticated {
                reason: Some("access denied".to_string()),
            });
            return Err(SessionError::AccessDenied(user.email));
        }

        info!("signed in as {}", user.email);
        self.cache_user(&user);
        self.publish(SessionState::Authenticated { user: user.clone() });
        Ok(LoginOutcome {
            user,
            storage_warning,
        })
    }

    pub fn logout(&self) {
        self.clear_credentials();
        self.publish(SessionState::Unauthenticated { reason: None });
        info!("signed out");
    }

    fn clear_credentials(&self) {
        self.store.remove_item(TOKEN_KEY);
        self.store.remove_item(USER_KEY);
    }

    fn cache_user(&self, user: &CurrentUser) {
        match serde_json::to_string(user) {
            Ok(json) => {
                self.store.set_item(USER_KEY, &json);
            }
            Err(e) => warn!("could not serialise current user: {e}"),
        }
    }

    fn publish(&self, next: SessionState) -> SessionState {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });
        next
    }
}

/// Wait until `rx` reports a signed-out session and return the reason.
pub async fn wait_signed_out(rx: &mut watch::Receiver<SessionState>) -> String {
    let ended = rx
        .wait_for(|state| matches!(state, SessionState::Unauthenticated { .. }))
        .await;
    match ended {
        Ok(state) => match &*state {
            SessionState::Unauthenticated {
                reason: Some(reason),
            } => reason.clone(),
            _ => "signed out".to_string(),
        },
        Err(_) => "session closed".to_string(),
    }
}

impl<B: AuthBackend + 'static> Session<B> {
    /// Re-validate the session every `every` until `cancel` fires.
    ///
    /// Catches tokens revoked elsewhere (another process logging out, an
    /// admin demoting the account). The first check happens one period
    /// after spawning; call [`Session::resolve`] for the initial one.
    pub fn spawn_revalidation(
        self: &Arc<Self>,
        every: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            state = session.refresh() => {
                                debug!(
                                    "session revalidated: authenticated={}",
                                    state.is_authenticated()
                                );
                            }
                        }
                    }
                }
            }
            debug!("session revalidation stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::models::LoginResponse;
    use crate::store::{MemoryBackend, StorageBackend, StoreError};

    fn user(is_admin: bool, is_organizer: bool) -> CurrentUser {
        CurrentUser {
            id: "u1".into(),
            name: "Ama".into(),
            email: "ama@eventa.com".into(),
            is_admin,
            is_organizer,
            phone: None,
            created_at: None,
        }
    }

    struct FakeAuth {
        login: Mutex<Result<LoginResponse, ApiError>>,
        profile: Mutex<Result<CurrentUser, ApiError>>,
        profile_calls: AtomicU32,
    }

    impl FakeAuth {
        fn returning(profile: Result<CurrentUser, ApiError>) -> Self {
            Self {
                login: Mutex::new(Ok(LoginResponse {
                    token: "tok-1".into(),
                })),
                profile: Mutex::new(profile),
                profile_calls: AtomicU32::new(0),
            }
        }

        fn set_profile(&self, profile: Result<CurrentUser, ApiError>) {
            *self.profile.lock().unwrap() = profile;
        }
    }

    #[async_trait]
    impl AuthBackend for FakeAuth {
        async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
            self.login.lock().unwrap().clone()
        }

        async fn current_user(&self) -> Result<CurrentUser, ApiError> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            self.profile.lock().unwrap().clone()
        }
    }

    /// Backend whose profile call parks until released.
    struct GatedAuth {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl AuthBackend for GatedAuth {
        async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
            Ok(LoginResponse {
                token: "tok-1".into(),
            })
        }

        async fn current_user(&self) -> Result<CurrentUser, ApiError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(user(true, false))
        }
    }

    struct Blocked;

    impl StorageBackend for Blocked {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Blocked("SecurityError".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Blocked("SecurityError".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Blocked("SecurityError".into()))
        }
        fn describe(&self) -> String {
            "blocked".into()
        }
    }

    fn store_with_token() -> Arc<ClientStore> {
        let store = Arc::new(ClientStore::new(MemoryBackend::new()));
        store.set_item(TOKEN_KEY, "tok-1");
        store
    }

    #[tokio::test]
    async fn no_credential_is_unauthenticated() {
        let backend = FakeAuth::returning(Ok(user(true, false)));
        let session = Session::new(backend, Arc::new(ClientStore::memory_only()));
        assert_eq!(session.state(), SessionState::Loading);

        let state = session.resolve().await;
        assert_eq!(state, SessionState::Unauthenticated { reason: None });
        assert_eq!(session.backend().profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn admin_credential_resolves_with_roles() {
        let store = store_with_token();
        let session = Session::new(FakeAuth::returning(Ok(user(true, false))), store.clone());

        let state = session.resolve().await;
        assert!(state.roles().is_admin);
        assert!(store.get_item(USER_KEY).is_some_and(|u| u.contains("ama@eventa.com")));
    }

    #[tokio::test]
    async fn plain_user_is_denied_and_token_erased() {
        let store = store_with_token();
        let session = Session::new(FakeAuth::returning(Ok(user(false, false))), store.clone());

        let state = session.resolve().await;
        assert!(!state.is_authenticated());
        assert!(store.get_item(TOKEN_KEY).is_none());
        assert!(store.get_item(USER_KEY).is_none());
    }

    #[tokio::test]
    async fn backend_failure_erases_token() {
        let store = store_with_token();
        let session = Session::new(
            FakeAuth::returning(Err(ApiError::Unauthorized("jwt expired".into()))),
            store.clone(),
        );

        let state = session.resolve().await;
        assert!(matches!(
            state,
            SessionState::Unauthenticated { reason: Some(ref r) } if r.contains("jwt expired")
        ));
        assert!(store.get_item(TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn login_stores_token_and_publishes() {
        let store = Arc::new(ClientStore::new(MemoryBackend::new()));
        let session = Session::new(FakeAuth::returning(Ok(user(false, true))), store.clone());
        let mut rx = session.subscribe();

        let outcome = session.login("ama@eventa.com", "pw").await.expect("login");
        assert!(outcome.storage_warning.is_none());
        assert_eq!(store.get_item(TOKEN_KEY).as_deref(), Some("tok-1"));

        assert!(rx.has_changed().expect("sender alive"));
        assert!(rx.borrow_and_update().roles().is_organizer);
    }

    #[tokio::test]
    async fn login_with_blocked_storage_warns_but_succeeds() {
        let store = Arc::new(ClientStore::new(Blocked));
        let session = Session::new(FakeAuth::returning(Ok(user(true, false))), store.clone());

        let outcome = session.login("ama@eventa.com", "pw").await.expect("login");
        assert!(outcome.storage_warning.is_some());
        assert_eq!(store.get_item(TOKEN_KEY).as_deref(), Some("tok-1"));
        assert!(session.state().is_authenticated());
    }

    #[tokio::test]
    async fn bad_credentials_are_reported_inline() {
        let store = Arc::new(ClientStore::new(MemoryBackend::new()));
        let backend = FakeAuth::returning(Ok(user(true, false)));
        *backend.login.lock().unwrap() = Err(ApiError::Unauthorized("Invalid password".into()));
        let session = Session::new(backend, store.clone());

        let err = session.login("ama@eventa.com", "nope").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials(ref m) if m == "Invalid password"));
        assert!(store.get_item(TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn login_as_plain_user_is_denied() {
        let store = Arc::new(ClientStore::new(MemoryBackend::new()));
        let session = Session::new(FakeAuth::returning(Ok(user(false, false))), store.clone());

        let err = session.login("ama@eventa.com", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::AccessDenied(_)));
        assert!(store.get_item(TOKEN_KEY).is_none());
        assert!(!session.state().is_authenticated());
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let store = store_with_token();
        let session = Session::new(FakeAuth::returning(Ok(user(true, true))), store.clone());
        session.resolve().await;

        session.logout();
        assert_eq!(
            session.state(),
            SessionState::Unauthenticated { reason: None }
        );
        assert!(store.get_item(TOKEN_KEY).is_none());
        assert!(store.get_item(USER_KEY).is_none());
    }

    #[tokio::test]
    async fn check_overtaken_by_logout_is_discarded() {
        let store = store_with_token();
        let session = Arc::new(Session::new(
            GatedAuth {
                entered: Notify::new(),
                release: Notify::new(),
            },
            store.clone(),
        ));

        let pending = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.refresh().await }
        });

        session.backend().entered.notified().await;
        session.logout();
        session.backend().release.notify_one();
        pending.await.expect("join");

        assert!(!session.state().is_authenticated());
        assert!(store.get_item(TOKEN_KEY).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn revalidation_catches_revoked_token() {
        let store = store_with_token();
        let session = Arc::new(Session::new(
            FakeAuth::returning(Ok(user(true, false))),
            store.clone(),
        ));
        session.resolve().await;
        let mut rx = session.subscribe();

        let cancel = CancellationToken::new();
        let handle = session.spawn_revalidation(Duration::from_secs(10), cancel.clone());

        session
            .backend()
            .set_profile(Err(ApiError::Unauthorized("revoked".into())));

        rx.changed().await.expect("state change");
        assert!(!rx.borrow().is_authenticated());
        assert!(store.get_item(TOKEN_KEY).is_none());

        cancel.cancel();
        handle.await.expect("task exits cleanly");
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_for_sign_out_reports_the_reason() {
        let store = store_with_token();
        let session = Arc::new(Session::new(
            FakeAuth::returning(Ok(user(false, true))),
            store.clone(),
        ));
        session.resolve().await;
        let mut rx = session.subscribe();

        let cancel = CancellationToken::new();
        let handle = session.spawn_revalidation(DEFAULT_REVALIDATE_INTERVAL, cancel.clone());

        // Still signed in after a few healthy checks.
        tokio::time::sleep(DEFAULT_REVALIDATE_INTERVAL * 3).await;
        assert!(session.state().is_authenticated());

        session
            .backend()
            .set_profile(Err(ApiError::Unauthorized("Token revoked".into())));
        let reason = wait_signed_out(&mut rx).await;
        assert!(reason.contains("Token revoked"));

        cancel.cancel();
        handle.await.expect("task exits cleanly");
    }

    #[tokio::test]
    async fn waiting_after_logout_returns_at_once() {
        let store = store_with_token();
        let session = Session::new(FakeAuth::returning(Ok(user(true, false))), store);
        session.resolve().await;
        let mut rx = session.subscribe();

        session.logout();
        assert_eq!(wait_signed_out(&mut rx).await, "signed out");
    }
}
