use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsentError {
    #[error("Invalid application")]
    InvalidApplication,

    #[error("No scopes to consent to")]
    NothingToConsent,

    #[error("A grant is already in progress for this consent request")]
    GrantInProgress,

    #[error("Consent interaction already completed")]
    InteractionClosed,

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to connect to consent service: {0}")]
    RequestFailed(String),

    #[error("Response error (status {0}): {1}")]
    ResponseError(u16, String),

    #[error("Failed to deserialize response: {0}")]
    DeserializationError(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid custom scope catalog: {0}")]
    InvalidCatalog(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl ConsentError {
    /// Whether the interaction that produced this error can be retried.
    ///
    /// Remote rejections and transport failures leave the interaction usable.
    /// An invalid application or a closed interaction is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConsentError::Rejected(_)
                | ConsentError::RequestFailed(_)
                | ConsentError::ResponseError(..)
                | ConsentError::DeserializationError(_)
                | ConsentError::Reqwest(_)
        )
    }
}
