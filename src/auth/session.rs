//! Session state and its reducer

use ottica_storefront_core::{Reducer, User};
use serde::Serialize;

/// Where the session currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Session state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        if self.loading {
            SessionStatus::Authenticating
        } else if self.is_authenticated {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Login or registration submitted
    AuthPending,
    AuthSucceeded(User),
    AuthFailed(String),
    ProfileLoaded(User),
    ProfileFailed(String),
    /// Local logout or server-side invalidation
    Logout,
    ClearError,
}

impl Reducer for SessionState {
    type Action = SessionAction;

    fn reduce(&mut self, action: SessionAction) {
        match action {
            SessionAction::AuthPending => {
                self.loading = true;
                self.error = None;
            }
            SessionAction::AuthSucceeded(user) | SessionAction::ProfileLoaded(user) => {
                self.user = Some(user);
                self.is_authenticated = true;
                self.loading = false;
                self.error = None;
            }
            // Prior user and authentication flag stay as they were.
            SessionAction::AuthFailed(message) | SessionAction::ProfileFailed(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            SessionAction::Logout => {
                self.user = None;
                self.is_authenticated = false;
                self.loading = false;
                self.error = None;
            }
            SessionAction::ClearError => self.error = None,
        }
    }
}
