//! Error taxonomy shared by the token manager, the transport and the listing client.
//!
//! Callers usually only need the three classification helpers on [`Error`]:
//! "try again later", "needs re-authorization" and "bad input/data".

use http::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Parsing(#[from] ParsingError),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("no credentials loaded; run the authorization flow first")]
    NotInitialized,
    #[error("refresh token rejected by authorization server ({status}): {body}")]
    RefreshRejected { status: StatusCode, body: String },
    #[error("authorization server unavailable: {0}")]
    RefreshUnavailable(#[source] Box<Error>),
    #[error("access token rejected by API after refresh")]
    TokenRejected,
}

#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<Error>,
    },
}

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("listing '{0}' not found")]
    ListingNotFound(String),
    #[error("rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("server error {0}")]
    ServerError(StatusCode),
    #[error("request rejected ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Debug, Clone, Error)]
pub enum ParsingError {
    #[error("no item id in url '{0}'")]
    InvalidUrl(String),
    #[error("required field '{0}' missing from payload")]
    MissingRequiredField(&'static str),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    #[error("credential file '{path}': {message}")]
    Io { path: String, message: String },
    #[error("credential file '{path}' is not valid dotenv: {message}")]
    Syntax { path: String, message: String },
    #[error("credential key '{key}' has invalid value '{value}'")]
    Malformed { key: String, value: String },
}

impl Error {
    /// Transient condition, the same call may succeed later.
    pub fn is_retriable_later(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Api(ApiError::RateLimited { .. }) | Error::Api(ApiError::ServerError(_)) => true,
            Error::Auth(AuthError::RefreshUnavailable(_)) => true,
            _ => false,
        }
    }

    /// Stored credentials are missing or no longer accepted.
    pub fn needs_reauthorization(&self) -> bool {
        matches!(
            self,
            Error::Auth(AuthError::NotInitialized)
                | Error::Auth(AuthError::RefreshRejected { .. })
                | Error::Auth(AuthError::TokenRejected)
        )
    }

    /// The input or the upstream data is unusable; retrying will not help.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            Error::Parsing(_) | Error::Api(ApiError::ListingNotFound(_)) | Error::Api(ApiError::Rejected { .. })
        )
    }
}
