use serde_json::Value;

use crate::domain::errors::{ApiError, ApiErrorKind, FALLBACK_MESSAGE};

// `{ success: true, data }` -> `data`. Any other body is returned untouched.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map)
            if map.get("success") == Some(&Value::Bool(true)) && map.contains_key("data") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Builds the single error shape every backend failure is reported as.
///
/// `status` is `None` when the request never produced an HTTP response.
pub fn normalize_failure(status: Option<u16>, body: Option<Value>) -> ApiError {
    let Some(status) = status else {
        return ApiError::network();
    };

    let envelope_message = body
        .as_ref()
        .filter(|body| body.get("success") == Some(&Value::Bool(false)))
        .map(|body| envelope_message(body.get("message")));

    let (kind, message) = match envelope_message {
        Some(Some(message)) => (ApiErrorKind::Rejected, message),
        Some(None) => (ApiErrorKind::Rejected, FALLBACK_MESSAGE.to_string()),
        None => (ApiErrorKind::Unexpected, FALLBACK_MESSAGE.to_string()),
    };

    ApiError {
        kind,
        message,
        status: Some(status),
        body,
    }
}

// Field-level validation failures arrive as a list of strings.
fn envelope_message(message: Option<&Value>) -> Option<String> {
    let message = match message? {
        Value::String(message) => message.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    Some(message).filter(|message| !message.trim().is_empty())
}
