// src/token/expiration.rs
use super::AuthError;
use crate::types::SessionExpiration;
use chrono::{DateTime, Duration, SubsecRound, Utc};

// Presigned STS urls are valid for 15 minutes after the x-amz-date timestamp.
pub const PRESIGNED_URL_EXPIRATION_SECS: i64 = 15 * 60;
pub const EXPIRATION_CUSHION_SECS: i64 = 60;

/// Expiration to advertise for a freshly signed token.
///
/// Starts from the presigned URL lifetime minus a one minute cushion. A known
/// session expiration (also minus the cushion) wins when it is earlier. If the
/// session's safe boundary is not after `now` the token would be rejected on
/// arrival, so this fails instead.
///
/// Results are truncated to whole seconds, which is the precision of the
/// exec-credential timestamp.
pub fn token_expiration(
    now: DateTime<Utc>,
    session: &SessionExpiration,
) -> Result<DateTime<Utc>, AuthError> {
    let cushion = Duration::seconds(EXPIRATION_CUSHION_SECS);
    let nominal = (now + Duration::seconds(PRESIGNED_URL_EXPIRATION_SECS) - cushion).trunc_subsecs(0);

    let session_expires_at = match session {
        SessionExpiration::Unknown => return Ok(nominal),
        SessionExpiration::Known(at) => *at,
    };

    let safe = (session_expires_at - cushion).trunc_subsecs(0);
    if safe <= now {
        return Err(AuthError::SessionExpiresSoon);
    }
    if safe < nominal {
        return Ok(safe);
    }
    Ok(nominal)
}
