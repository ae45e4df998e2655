// src/token/retry.rs
use super::signer::RequestSigner;
use super::AuthError;
use crate::config::RetryPolicy;
use crate::types::{ClusterName, RoleArn, SignedRequest};
use tokio::time::{sleep, sleep_until, timeout_at, Instant};
use tracing::{debug, warn};

/// Calls `signer` until it succeeds or `policy.timeout` has elapsed, waiting
/// `policy.interval` between attempts.
///
/// Attempts run one at a time and each one is cut off at the deadline, so the
/// whole call never outlives the budget. On timeout the last signing error is
/// reported.
pub async fn sign_with_retry<S>(
    signer: &S,
    cluster: &ClusterName,
    role: Option<&RoleArn>,
    policy: &RetryPolicy,
) -> Result<SignedRequest, AuthError>
where
    S: RequestSigner + ?Sized,
{
    let deadline = Instant::now().checked_add(policy.timeout).ok_or_else(|| {
        AuthError::InvalidConfig(format!(
            "retry timeout of {} seconds is out of range",
            policy.timeout.as_secs()
        ))
    })?;
    let mut last_error: Option<String> = None;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match timeout_at(deadline, signer.sign(cluster, role)).await {
            Ok(Ok(signed)) => {
                debug!(attempt, "signed STS request");
                return Ok(signed);
            }
            Ok(Err(err)) => {
                warn!(attempt, error = %err, "signing attempt failed");
                last_error = Some(err.to_string());
            }
            Err(_) => {
                let last = last_error.unwrap_or_else(|| {
                    format!("signing attempt {} did not finish before the deadline", attempt)
                });
                return Err(AuthError::RetryTimeout { last });
            }
        }

        tokio::select! {
            biased;
            _ = sleep_until(deadline) => {
                return Err(AuthError::RetryTimeout {
                    last: last_error.unwrap_or_default(),
                });
            }
            _ = sleep(policy.interval) => {}
        }
    }
}
