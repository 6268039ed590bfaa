//! Error handling for the storefront client

use std::fmt;
use thiserror::Error;

pub use ottica_storefront_gateway::{ErrorKind, GatewayError};

/// Unified error type for the storefront client
#[derive(Error, Debug)]
pub enum Error {
    /// Errors raised while talking to the API
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A product slug that cannot name a single path segment
    #[error("Invalid product slug: {0:?}")]
    InvalidSlug(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Gateway(err) => err.kind(),
            Error::InvalidSlug(_) => ErrorKind::Validation,
            Error::Url(_) | Error::Config(_) => ErrorKind::Unclassified,
        }
    }

    /// True when the session is gone and the user must sign in again
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::Gateway(GatewayError::SessionExpired))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
