//! Ottica storefront API gateway
//!
//! Every call to the storefront REST API goes through [`Gateway`]. It attaches
//! the stored access token as a bearer credential and, when the server answers
//! `401 Unauthorized`, refreshes the access token once and replays the
//! request. If the refresh itself fails, both tokens are dropped and a
//! [`GatewayEvent::SessionInvalidated`] is broadcast so the application can
//! send the user back to the login page.

mod credentials;
mod error;
mod request;

pub use credentials::{
    CredentialStore, Credentials, MemoryCredentialStore, ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
};
pub use error::{ErrorKind, GatewayError};
pub use request::{ApiRequest, ApiResponse};

use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

const REFRESH_PATH: &str = "/auth/refresh/";

/// Gateway options
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub request_timeout: Duration,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Share a single in-flight refresh between concurrent requests
    pub coalesce_refresh: bool,
    /// Where the application should navigate once the session is gone
    pub login_path: String,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            access_token_ttl: Duration::from_secs(24 * 60 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            coalesce_refresh: true,
            login_path: "/login".to_string(),
        }
    }
}

/// Events emitted by the gateway outside of any single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// The refresh token was rejected; credentials have been cleared.
    SessionInvalidated { login_path: String },
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present when the server rotates refresh tokens
    #[serde(default)]
    refresh: Option<String>,
}

/// Authenticated REST client
pub struct Gateway {
    base_url: String,
    http_client: Client,
    credentials: Arc<dyn CredentialStore>,
    options: GatewayOptions,
    refresh_lock: Mutex<()>,
    events: broadcast::Sender<GatewayEvent>,
}

impl Gateway {
    /// Create a gateway with an in-memory credential store
    pub fn new(base_url: &str, options: GatewayOptions) -> Result<Self, GatewayError> {
        Self::with_credential_store(base_url, options, Arc::new(MemoryCredentialStore::new()))
    }

    pub fn with_credential_store(
        base_url: &str,
        options: GatewayOptions,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, GatewayError> {
        let parsed = url::Url::parse(base_url)?;
        if parsed.cannot_be_a_base() {
            return Err(GatewayError::Config(format!(
                "API base URL cannot be a base: {}",
                base_url
            )));
        }

        let http_client = Client::builder()
            .timeout(options.request_timeout)
            .build()?;
        let (events, _) = broadcast::channel(16);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            credentials,
            options,
            refresh_lock: Mutex::new(()),
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    /// Subscribe to session invalidation events
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }

    pub fn access_token(&self) -> Option<String> {
        self.credentials.get(ACCESS_TOKEN_COOKIE)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.credentials.get(REFRESH_TOKEN_COOKIE)
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token().is_some()
    }

    /// Persist a freshly issued credential pair
    pub fn store_credentials(&self, credentials: &Credentials) {
        self.credentials.set(
            ACCESS_TOKEN_COOKIE,
            &credentials.access,
            Some(self.options.access_token_ttl),
        );
        self.credentials.set(
            REFRESH_TOKEN_COOKIE,
            &credentials.refresh,
            Some(self.options.refresh_token_ttl),
        );
    }

    pub fn clear_credentials(&self) {
        self.credentials.remove(ACCESS_TOKEN_COOKIE);
        self.credentials.remove(REFRESH_TOKEN_COOKIE);
    }

    /// Generic request entry point.
    ///
    /// Non-success statuses come back as [`GatewayError::Api`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        params: Option<&[(String, String)]>,
    ) -> Result<ApiResponse, GatewayError> {
        let mut request = ApiRequest::new(method, path);
        if let Some(params) = params {
            request = request.query(params.iter().cloned());
        }
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.send(request).await
    }

    /// GET a JSON resource
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::get(path).query(params.iter().cloned());
        self.send(request).await?.json()
    }

    /// POST a JSON body and parse the JSON response
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::post(path).json(body)?;
        self.send(request).await?.json()
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::put(path).json(body)?;
        self.send(request).await?.json()
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let request = ApiRequest::patch(path).json(body)?;
        self.send(request).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), GatewayError> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Send a request, refreshing the access token at most once on `401`.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        let token = self.access_token();
        let response = self.dispatch(&request, token.as_deref()).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return response.error_for_status();
        }

        if self.refresh_token().is_none() {
            debug!(path = request.path(), "401 without refresh token");
            return response.error_for_status();
        }

        let access = match self.refresh(token.as_deref()).await {
            Ok(access) => access,
            Err(err) => {
                warn!(path = request.path(), error = %err, "token refresh failed");
                self.invalidate_session();
                return Err(GatewayError::SessionExpired);
            }
        };

        // Single retry: a second 401 is surfaced as-is.
        self.dispatch(&request, Some(&access))
            .await?
            .error_for_status()
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<ApiResponse, GatewayError> {
        debug!(
            method = %request.method(),
            path = request.path(),
            authenticated = access_token.is_some(),
            "api request"
        );
        let response = request
            .build(&self.http_client, &self.base_url, access_token)?
            .send()
            .await?;
        ApiResponse::read(response).await
    }

    /// Obtain a new access token. `rejected` is the token the caller was
    /// refused with.
    async fn refresh(&self, rejected: Option<&str>) -> Result<String, GatewayError> {
        if !self.options.coalesce_refresh {
            return self.request_new_access_token().await;
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(current) = self.access_token() {
            if rejected != Some(current.as_str()) {
                debug!("reusing access token refreshed by a concurrent request");
                return Ok(current);
            }
        }
        self.request_new_access_token().await
    }

    async fn request_new_access_token(&self) -> Result<String, GatewayError> {
        let refresh = self
            .refresh_token()
            .ok_or(GatewayError::SessionExpired)?;

        // Unauthenticated on purpose: the refresh endpoint must not see the
        // expired access token.
        let response = ApiRequest::post(REFRESH_PATH)
            .json(&RefreshRequest { refresh: &refresh })?
            .build(&self.http_client, &self.base_url, None)?
            .send()
            .await?;
        let response = ApiResponse::read(response).await?.error_for_status()?;
        let tokens: RefreshResponse = response.json()?;

        self.credentials.set(
            ACCESS_TOKEN_COOKIE,
            &tokens.access,
            Some(self.options.access_token_ttl),
        );
        if let Some(rotated) = &tokens.refresh {
            self.credentials.set(
                REFRESH_TOKEN_COOKIE,
                rotated,
                Some(self.options.refresh_token_ttl),
            );
        }
        info!("access token refreshed");
        Ok(tokens.access)
    }

    fn invalidate_session(&self) {
        self.clear_credentials();
        // No subscribers is fine.
        let _ = self.events.send(GatewayEvent::SessionInvalidated {
            login_path: self.options.login_path.clone(),
        });
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
