use axum::http::StatusCode;
use std::fmt;

/// Failures a gateway call or a page action can run into.
///
/// Callers of the gateway never see these directly: the gateway turns each one
/// into its user-facing side effect and hands back `Outcome::Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Client storage cannot be read or written.
    StorageUnavailable(String),
    /// No credential, or the API answered 401.
    Unauthenticated,
    /// The call never completed, or its body could not be read.
    Network(String),
    /// Non-2xx answer other than 401.
    Server {
        status: u16,
        message: Option<String>,
    },
    /// Import file that is not a JSON array of tasks.
    MalformedImport(String),
}

impl ClientError {
    pub fn network(err: impl fmt::Display) -> Self {
        Self::Network(err.to_string())
    }

    pub fn storage(err: impl fmt::Display) -> Self {
        Self::StorageUnavailable(err.to_string())
    }

    /// Text shown to the user, or `None` when the error is signalled by a
    /// redirect instead.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::StorageUnavailable(_) => Some(
                "Local storage is unavailable. Disable private browsing and try again.".to_string(),
            ),
            Self::Unauthenticated => None,
            Self::Network(_) => Some("Connection error. Check your network.".to_string()),
            Self::Server {
                message: Some(message),
                ..
            } => Some(message.clone()),
            Self::Server { status, .. } => Some(format!("Error {status}")),
            Self::MalformedImport(_) => Some("Invalid JSON file".to_string()),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageUnavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::Unauthenticated => write!(f, "not authenticated"),
            Self::Network(reason) => write!(f, "network failure: {reason}"),
            Self::Server {
                status,
                message: Some(message),
            } => write!(f, "server error {status}: {message}"),
            Self::Server { status, .. } => write!(f, "server error {status}"),
            Self::MalformedImport(reason) => write!(f, "malformed import file: {reason}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err)
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
