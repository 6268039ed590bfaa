//! Credential persistence
//!
//! Tokens are kept the way a browser keeps cookies: a named value with a
//! client-declared expiry. The expiry only drives cleanup; token contents are
//! never inspected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Access and refresh token issued together by login or registration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access: String,
    pub refresh: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Named, expiring storage for tokens
pub trait CredentialStore: Send + Sync {
    /// Returns the value if present and not expired.
    fn get(&self, name: &str) -> Option<String>;

    /// Stores a value. `ttl` of `None` keeps it until removed.
    fn set(&self, name: &str, value: &str, ttl: Option<Duration>);

    fn remove(&self, name: &str);
}

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredCookie {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

/// In-process cookie jar
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    cookies: RwLock<HashMap<String, StoredCookie>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value with an absolute expiry.
    pub fn set_until(&self, name: &str, value: &str, expires_at: Option<DateTime<Utc>>) {
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        cookies.insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    /// Expiry of a stored value, if it has one.
    pub fn expires_at(&self, name: &str) -> Option<DateTime<Utc>> {
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        cookies.get(name).and_then(|c| c.expires_at)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, name: &str) -> Option<String> {
        let now = Utc::now();
        {
            let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
            match cookies.get(name) {
                None => return None,
                Some(cookie) if !cookie.is_expired(now) => return Some(cookie.value.clone()),
                Some(_) => {}
            }
        }

        // Re-check under the write lock: a concurrent set may have replaced
        // the expired value.
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        match cookies.get(name) {
            Some(cookie) if !cookie.is_expired(Utc::now()) => Some(cookie.value.clone()),
            Some(_) => {
                cookies.remove(name);
                None
            }
            None => None,
        }
    }

    fn set(&self, name: &str, value: &str, ttl: Option<Duration>) {
        let expires_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        self.set_until(name, value, expires_at);
    }

    fn remove(&self, name: &str) {
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        cookies.remove(name);
    }
}
