//! Configuration options for the storefront client

use std::time::Duration;

use ottica_storefront_core::MapConfig;
use ottica_storefront_gateway::GatewayOptions;

use crate::error::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Configuration options for the storefront client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the REST API, including the version prefix
    pub api_url: String,

    /// The request timeout
    pub request_timeout: Duration,

    /// Lifetime of the stored access token
    pub access_token_ttl: Duration,

    /// Lifetime of the stored refresh token
    pub refresh_token_ttl: Duration,

    /// Whether concurrent requests share one token refresh
    pub coalesce_refresh: bool,

    /// Login entry point the user is sent to when the session expires
    pub login_path: String,

    /// Map viewport used until the server provides one
    pub map_config: MapConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            access_token_ttl: Duration::from_secs(24 * 60 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            coalesce_refresh: true,
            login_path: "/login".to_string(),
            map_config: MapConfig::default(),
        }
    }
}

impl ClientOptions {
    /// Load options from the environment (and a `.env` file, if present).
    ///
    /// Reads `OTTICA_API_URL`, `OTTICA_REQUEST_TIMEOUT_SECS` and
    /// `OTTICA_LOGIN_PATH`; anything unset keeps its default.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let mut options = Self::default();
        if let Ok(url) = std::env::var("OTTICA_API_URL") {
            options = options.with_api_url(&url);
        }
        if let Ok(secs) = std::env::var("OTTICA_REQUEST_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                Error::config(format!("OTTICA_REQUEST_TIMEOUT_SECS: {}", e))
            })?;
            options = options.with_request_timeout(Duration::from_secs(secs));
        }
        if let Ok(path) = std::env::var("OTTICA_LOGIN_PATH") {
            options = options.with_login_path(&path);
        }
        Ok(options)
    }

    /// Set the API base URL
    pub fn with_api_url(mut self, value: &str) -> Self {
        self.api_url = value.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Duration) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the access and refresh token lifetimes
    pub fn with_token_ttls(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_token_ttl = access;
        self.refresh_token_ttl = refresh;
        self
    }

    /// Set whether concurrent requests share one token refresh
    pub fn with_coalesce_refresh(mut self, value: bool) -> Self {
        self.coalesce_refresh = value;
        self
    }

    /// Set the login entry point
    pub fn with_login_path(mut self, value: &str) -> Self {
        self.login_path = value.to_string();
        self
    }

    /// Set the fallback map viewport
    pub fn with_map_config(mut self, value: MapConfig) -> Self {
        self.map_config = value;
        self
    }

    pub(crate) fn gateway_options(&self) -> GatewayOptions {
        GatewayOptions {
            request_timeout: self.request_timeout,
            access_token_ttl: self.access_token_ttl,
            refresh_token_ttl: self.refresh_token_ttl,
            coalesce_refresh: self.coalesce_refresh,
            login_path: self.login_path.clone(),
        }
    }
}
