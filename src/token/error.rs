// src/token/error.rs
use std::error::Error as StdError;
use std::io;

/// Failure of a single signing attempt. The retry loop absorbs these until
/// its budget runs out.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("error loading AWS credentials: {0}")]
    Credentials(String),

    #[error("invalid STS request: {0}")]
    InvalidRequest(String),

    #[error("error presigning AWS request: {0}")]
    Presign(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("cluster-name not provided")]
    MissingClusterName,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("timeout while trying to get signed aws request: last error: {last}")]
    RetryTimeout { last: String },

    #[error("AWS credentials provider does not report a session expiration")]
    SessionExpirationUnknown,

    #[error("session expires in less than one minute")]
    SessionExpiresSoon,

    #[error("signed request is empty")]
    EmptySignedRequest,

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("error serializing exec credential: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("error printing to stdout: {0}")]
    Output(#[from] io::Error),
}

impl AuthError {
    /// Process exit status for this failure. Codes are stable; the exec
    /// plugin's callers match on them.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingClusterName => 25,
            Self::InvalidConfig(_) => 26,
            Self::RetryTimeout { .. } => 13,
            Self::SessionExpirationUnknown => 14,
            Self::SessionExpiresSoon => 3,
            Self::Output(_) => 4,
            Self::Serialization(_) => 5,
            Self::EmptySignedRequest => 55,
            Self::Signing(_) => 100,
        }
    }

    /// Short prefix printed ahead of the error on fatal exits.
    pub fn context(&self) -> Option<&'static str> {
        match self {
            Self::MissingClusterName | Self::InvalidConfig(_) => None,
            Self::RetryTimeout { .. } | Self::Signing(_) | Self::EmptySignedRequest => {
                Some("error signing request with retry")
            }
            Self::SessionExpirationUnknown => Some("error get expiration"),
            Self::SessionExpiresSoon => Some("error getting token expiration date"),
            Self::Serialization(_) => Some("error formatting exec credential"),
            Self::Output(_) => Some("error printing to stdout"),
        }
    }
}

/// Flattens an error and its sources into one line. SDK errors keep the
/// useful detail in their source chain.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}
