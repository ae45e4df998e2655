// src/token/mod.rs
mod encoder;
pub(crate) mod error;
mod exec_credential;
mod expiration;
mod retry;
mod signer;

pub use encoder::encode_token;
pub use error::AuthError;
pub use exec_credential::ExecCredential;
pub use expiration::token_expiration;
pub use retry::sign_with_retry;
pub use signer::{AwsRequestSigner, RequestSigner};

use crate::config::AuthConfig;
use crate::types::SessionExpiration;
use chrono::Utc;
use tracing::{debug, info};

/// Signs (with retry), encodes and dates a token for `config.cluster`.
///
/// Nothing is returned unless every step succeeded.
pub async fn issue_credential<S>(signer: &S, config: &AuthConfig) -> Result<ExecCredential, AuthError>
where
    S: RequestSigner + ?Sized,
{
    let signed = sign_with_retry(signer, &config.cluster, config.role.as_ref(), &config.retry).await?;
    if signed.url.is_empty() {
        return Err(AuthError::EmptySignedRequest);
    }

    if signed.session_expiration == SessionExpiration::Unknown && config.require_session_expiration {
        return Err(AuthError::SessionExpirationUnknown);
    }

    let token = encode_token(&signed.url);
    let expiration = token_expiration(Utc::now(), &signed.session_expiration)?;
    debug!(session = ?signed.session_expiration, "token expiration computed");
    info!(cluster = %config.cluster, expires = %expiration, "issued exec credential");

    Ok(ExecCredential::new(token, expiration))
}
