use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Gateway error
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("request failed"))]
    Api {
        status: u16,
        message: Option<String>,
        body: Option<Value>,
    },

    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`GatewayError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced an HTTP response
    Transport,
    /// Credentials are missing, rejected or could not be refreshed
    Authentication,
    /// The server rejected the request with a 4xx and (usually) a message
    Validation,
    Unclassified,
}

impl GatewayError {
    /// Builds an [`GatewayError::Api`] from a non-success response body.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let json = serde_json::from_slice::<Value>(body).ok();
        let message = match &json {
            Some(value) => extract_message(value),
            None => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                (!text.is_empty()).then_some(text)
            }
        };

        GatewayError::Api {
            status: status.as_u16(),
            message,
            body: json,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Http(_) => ErrorKind::Transport,
            GatewayError::SessionExpired => ErrorKind::Authentication,
            GatewayError::Api { status, .. } => match *status {
                401 | 403 => ErrorKind::Authentication,
                400..=499 => ErrorKind::Validation,
                _ => ErrorKind::Unclassified,
            },
            GatewayError::Json(_) | GatewayError::Url(_) | GatewayError::Config(_) => {
                ErrorKind::Unclassified
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            GatewayError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The server-provided message, if the server sent one.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            GatewayError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message shown to the user: the server message when present, otherwise
    /// `fallback`.
    pub fn describe(&self, fallback: &str) -> String {
        match self {
            GatewayError::SessionExpired => self.to_string(),
            _ => self
                .api_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

/// Pulls a readable message out of a REST error body.
///
/// Recognises `{"message": ..}`, `{"detail": ..}` and field error maps such as
/// `{"email": ["already registered"], "non_field_errors": [..]}`.
fn extract_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => {
            for key in ["message", "detail", "error"] {
                if let Some(Value::String(s)) = map.get(key) {
                    return Some(s.clone());
                }
            }

            let fields: Vec<String> = map
                .iter()
                .filter_map(|(field, errors)| {
                    let text = join_errors(errors)?;
                    if field == "non_field_errors" {
                        Some(text)
                    } else {
                        Some(format!("{}: {}", field, text))
                    }
                })
                .collect();

            (!fields.is_empty()).then(|| fields.join("; "))
        }
        Value::Array(_) => join_errors(value),
        _ => None,
    }
}

fn join_errors(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}
