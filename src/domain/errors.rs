use serde_json::Value;
use thiserror::Error;

// User-displayable fallbacks produced by the response normalizer.
pub const NETWORK_MESSAGE: &str = "No se pudo conectar con el servidor";
pub const FALLBACK_MESSAGE: &str = "Ha ocurrido un error inesperado";

// Login failures are never shown in detail.
pub const ACCESS_DENIED_MESSAGE: &str = "ACCESS DENIED: Invalid Credentials";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    // No HTTP status: the backend could not be reached.
    Network,
    // Envelope failure `{ success: false, message }`, typically validation.
    Rejected,
    // Any other non-success status.
    Unexpected,
    // A success response whose body did not match the expected type.
    Decode,
}

/// Normalized failure of a backend call.
///
/// `message` is always present and safe to show to the user. The raw body and
/// status are kept for callers that need field-level detail.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<Value>,
}

impl ApiError {
    pub fn network() -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: NETWORK_MESSAGE.to_string(),
            status: None,
            body: None,
        }
    }

    pub fn decode(status: u16) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            message: FALLBACK_MESSAGE.to_string(),
            status: Some(status),
            body: None,
        }
    }

    pub fn is_network(&self) -> bool {
        self.kind == ApiErrorKind::Network
    }

    // Individual messages when the envelope carried a list of field errors.
    pub fn field_messages(&self) -> Vec<String> {
        match self.body.as_ref().and_then(|body| body.get("message")) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(message)) => vec![message.clone()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing required login fields: {fields:?}")]
    IncompleteCredentials { fields: Vec<&'static str> },
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("network error: {0}")]
    Network(ApiError),
    #[error("malformed or expired access token")]
    MalformedToken,
    #[error("failed to persist session: {0}")]
    StorageFailure(#[from] StorageError),
}

impl AuthError {
    // Every login failure maps to the same message on screen.
    pub fn user_message(&self) -> &'static str {
        ACCESS_DENIED_MESSAGE
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page {requested} is outside 1..={total_pages}")]
    OutOfRange { requested: u32, total_pages: u32 },
    #[error("page size must be greater than zero")]
    InvalidLimit,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
