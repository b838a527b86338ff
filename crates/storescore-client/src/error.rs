use thiserror::Error;

/// Errors returned by the StoreScore API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API error {status} from {url}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        status: u16,
        url: String,
        detail: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("pagination limit reached for {url}: exceeded {max_pages} pages")]
    PaginationLimit { url: String, max_pages: usize },
}

impl ClientError {
    /// Backend-supplied explanation, when the response carried one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Looks at `detail`, `error` and `message`, then `non_field_errors`, then
/// the first field error (`{"name": ["already exists"]}` becomes
/// `name: already exists`). Non-JSON bodies yield `None`.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    first_message(&value, None)
}

fn first_message(value: &serde_json::Value, field: Option<&str>) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::String(s) if !s.trim().is_empty() => Some(match field {
            Some(f) => format!("{f}: {s}"),
            None => s.clone(),
        }),
        Value::Array(items) => items.iter().find_map(|v| first_message(v, field)),
        Value::Object(map) => {
            for key in ["detail", "error", "message", "non_field_errors"] {
                if let Some(msg) = map.get(key).and_then(|v| first_message(v, None)) {
                    return Some(msg);
                }
            }
            map.iter()
                .find_map(|(k, v)| first_message(v, Some(k.as_str())))
        }
        _ => None,
    }
}
