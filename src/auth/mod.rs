//! Authentication and the customer session

mod session;
mod types;

use std::sync::Arc;

use ottica_storefront_core::User;
use ottica_storefront_gateway::{Gateway, GatewayError, GatewayEvent};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::store::StateStore;

pub use session::*;
pub use types::*;

const LOGIN_PATH: &str = "/auth/login/";
const REGISTER_PATH: &str = "/auth/register/";
const PROFILE_PATH: &str = "/auth/profile/";

/// Session store backed by the API gateway
pub struct SessionStore {
    gateway: Arc<Gateway>,
    state: StateStore<SessionState>,
}

impl SessionStore {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            state: StateStore::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read(|s| s.is_authenticated)
    }

    /// Sign in with username and password
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        debug!(username = %credentials.username, "login");
        self.authenticate(LOGIN_PATH, credentials, "Login failed")
            .await
    }

    /// Create an account; a successful registration also signs the user in.
    pub async fn register(&self, data: &RegistrationData) -> Result<User, Error> {
        debug!(username = %data.username, "register");
        self.authenticate(REGISTER_PATH, data, "Registration failed")
            .await
    }

    async fn authenticate<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<User, Error> {
        self.state.dispatch(SessionAction::AuthPending);

        match self.gateway.post::<_, AuthResponse>(path, body).await {
            Ok(response) => {
                self.gateway.store_credentials(&response.credentials());
                info!(user_id = response.user.id, "signed in");
                self.state
                    .dispatch(SessionAction::AuthSucceeded(response.user.clone()));
                Ok(response.user)
            }
            Err(err) => {
                warn!(path, error = %err, "authentication failed");
                self.state
                    .dispatch(SessionAction::AuthFailed(err.describe(fallback)));
                Err(err.into())
            }
        }
    }

    /// Load the profile of the signed-in user.
    ///
    /// A failure is recorded in the state but does not end the session.
    pub async fn fetch_profile(&self) -> Result<User, Error> {
        match self.gateway.get::<User>(PROFILE_PATH, &[]).await {
            Ok(user) => {
                self.state.dispatch(SessionAction::ProfileLoaded(user.clone()));
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "profile fetch failed");
                self.state.dispatch(SessionAction::ProfileFailed(
                    err.describe("Failed to fetch profile"),
                ));
                Err(err.into())
            }
        }
    }

    /// Drop credentials and reset the session. Never fails.
    pub fn logout(&self) {
        self.gateway.clear_credentials();
        self.state.dispatch(SessionAction::Logout);
        info!("signed out");
    }

    pub fn clear_error(&self) {
        self.state.dispatch(SessionAction::ClearError);
    }

    /// True when an access token survives from a previous run
    pub fn has_stored_credentials(&self) -> bool {
        self.gateway.has_access_token()
    }

    /// Restore a session from stored credentials. Returns `Ok(None)` when
    /// there is nothing to restore.
    pub async fn restore(&self) -> Result<Option<User>, Error> {
        if !self.has_stored_credentials() {
            return Ok(None);
        }
        match self.fetch_profile().await {
            Ok(user) => Ok(Some(user)),
            Err(Error::Gateway(GatewayError::SessionExpired)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Reset the session after the server refused to refresh it
    pub fn invalidate(&self) {
        self.state.dispatch(SessionAction::Logout);
    }

    pub fn handle_event(&self, event: &GatewayEvent) {
        match event {
            GatewayEvent::SessionInvalidated { login_path } => {
                info!(login_path = %login_path, "session invalidated");
                self.invalidate();
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
