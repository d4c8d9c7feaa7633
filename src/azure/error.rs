use thiserror::Error;

#[derive(Debug, Error)]
pub enum AzureError {
    #[error("credential error: {0}")]
    Credential(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Azure API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl AzureError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Short machine-readable kind for diagnostics output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Credential(_) => "CredentialUnavailable",
            Self::Http(_) => "RequestFailed",
            Self::Status { .. } => "ApiError",
            Self::Malformed(_) => "MalformedResponse",
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
