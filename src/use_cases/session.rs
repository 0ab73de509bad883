use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::entities::{Role, Session};
use crate::domain::errors::{AuthError, StorageError};
use crate::domain::ports::{AuthApi, Clock, Navigator, SessionStorage};
use crate::domain::routes::Route;
use crate::use_cases::token::{decode_claims, is_expired};
use crate::use_cases::validation;

// Durable storage keys for the two session entries.
pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "auth_user";

/// Snapshot published to every subscriber of the session store.
///
/// The token and the user always change together, so readers never see a
/// token without its user or the other way round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    token: Option<String>,
    session: Option<Session>,
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // Valid iff a user is present and the token has not expired.
    pub fn authenticated_at(&self, now_epoch_seconds: u64) -> Option<&Session> {
        let session = self.session.as_ref()?;
        if is_expired(self.token.as_deref(), now_epoch_seconds) {
            return None;
        }
        Some(session)
    }
}

// Single source of truth for who is logged in.
pub struct SessionStore {
    clock: Arc<dyn Clock>,
    storage: Arc<dyn SessionStorage>,
    auth: Arc<dyn AuthApi>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<AuthState>,
}

impl SessionStore {
    // Rebuild the store from durable storage; an expired token is logged out right away.
    pub fn restore(
        clock: Arc<dyn Clock>,
        storage: Arc<dyn SessionStorage>,
        auth: Arc<dyn AuthApi>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let restored = read_persisted(storage.as_ref());
        let (state, _) = watch::channel(restored);
        let store = Self {
            clock,
            storage,
            auth,
            navigator,
            state,
        };

        if store.is_token_expired() {
            tracing::debug!("restored token missing or expired.");
            store.logout();
        }

        store
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_token_expired(&self) -> bool {
        is_expired(self.state.borrow().token(), self.clock.now_epoch_seconds())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    pub fn current_session(&self) -> Option<Session> {
        let now = self.clock.now_epoch_seconds();
        self.state.borrow().authenticated_at(now).cloned()
    }

    pub fn role(&self) -> Option<Role> {
        self.current_session().map(|session| session.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn is_digitador(&self) -> bool {
        self.role() == Some(Role::Digitador)
    }

    pub fn is_viewer(&self) -> bool {
        self.role() == Some(Role::Viewer)
    }

    // Two-letter avatar for the main layout.
    pub fn user_initials(&self) -> String {
        let username = self
            .current_session()
            .map(|session| session.username)
            .unwrap_or_else(|| "U".to_string());
        username.chars().take(2).collect::<String>().to_uppercase()
    }

    #[tracing::instrument(name = "login", skip_all, fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if let Err(errors) = validation::credentials(username, password) {
            let fields: Vec<&'static str> = errors.into_keys().collect();
            tracing::warn!(?fields, "login form incomplete.");
            return Err(AuthError::IncompleteCredentials { fields });
        }

        let token = self
            .auth
            .login(username, password)
            .await
            .map_err(|err| {
                if err.is_network() {
                    tracing::warn!(error = %err, "login failed: backend unreachable.");
                    AuthError::Network(err)
                } else {
                    tracing::warn!(status = ?err.status, "login rejected.");
                    AuthError::InvalidCredentials
                }
            })?;

        let claims = decode_claims(&token).map_err(|err| {
            tracing::warn!(error = ?err, "login returned an undecodable token.");
            AuthError::MalformedToken
        })?;
        if claims.exp <= self.clock.now_epoch_seconds() {
            tracing::warn!(exp = claims.exp, "login returned an already expired token.");
            return Err(AuthError::MalformedToken);
        }

        let session = claims.into_session();
        if let Err(err) = self.persist(&token, &session) {
            tracing::error!(error = %err, "failed to persist session.");
            self.clear_storage();
            return Err(AuthError::StorageFailure(err));
        }

        self.state.send_replace(AuthState {
            token: Some(token),
            session: Some(session.clone()),
        });
        tracing::info!(role = %session.role, "session started.");

        Ok(session)
    }

    // Safe to call at any time, any number of times.
    pub fn logout(&self) {
        self.clear_storage();

        let cleared = self.state.send_if_modified(|state| {
            if *state == AuthState::default() {
                return false;
            }
            *state = AuthState::default();
            true
        });
        if cleared {
            tracing::info!("session cleared.");
        }

        self.navigator.navigate(Route::Login);
    }

    // Logs out when a session is held but its token has expired. Returns true if it did.
    pub fn enforce_expiry(&self) -> bool {
        let has_session = self.state.borrow().session().is_some();
        if has_session && self.is_token_expired() {
            tracing::info!("session token expired.");
            self.logout();
            return true;
        }
        false
    }

    fn persist(&self, token: &str, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(session)?;
        self.storage.set(TOKEN_KEY, token)?;
        self.storage.set(USER_KEY, &user)?;
        Ok(())
    }

    fn clear_storage(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                tracing::warn!(key, error = %err, "failed to clear session entry.");
            }
        }
    }
}

fn read_persisted(storage: &dyn SessionStorage) -> AuthState {
    let token = storage.get(TOKEN_KEY).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to read stored token.");
        None
    });
    let session = match storage.get(USER_KEY) {
        Ok(Some(raw)) => serde_json::from_str::<Session>(&raw)
            .map_err(|err| tracing::warn!(error = %err, "stored user is unreadable."))
            .ok(),
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read stored user.");
            None
        }
    };
    AuthState { token, session }
}
