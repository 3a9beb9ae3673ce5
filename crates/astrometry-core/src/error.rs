use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, AstrometryError>;

#[derive(Debug, Error)]
pub enum AstrometryError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to login: {0}")]
    Auth(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("not authenticated: no session has been established")]
    Unauthenticated,

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub operation: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl AstrometryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Auth(_) => "AUTH_ERROR",
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Status { .. } => "HTTP_STATUS",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Http(_) => "HTTP_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Network-level or decode failure on a remote call.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::Transport(_) | Self::Http(_) | Self::Json(_)
        )
    }

    pub fn to_payload(&self, operation: impl Into<String>, url: Option<String>) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_string(),
            message: self.to_string(),
            operation: operation.into(),
            trace_id: Uuid::new_v4().to_string(),
            url,
        }
    }
}
