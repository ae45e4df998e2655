// types.rs
use chrono::{DateTime, Utc};
use clap::Parser;
use std::fmt;
use std::time::SystemTime;

/// Kubernetes exec-credential plugin that turns the caller's AWS IAM identity
/// into a short-lived cluster bearer token.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Name of the cluster the token is scoped to
    #[arg(long, default_value = "")]
    pub cluster_name: String,

    /// IAM role to assume before signing
    #[arg(long, default_value = "")]
    pub role_arn: String,

    /// STS signing region (defaults to the AWS region chain)
    #[arg(long)]
    pub region: Option<String>,

    /// Seconds to keep retrying a failing signing attempt
    #[arg(long, default_value_t = 60)]
    pub retry_timeout: u64,

    /// Seconds to wait between signing attempts
    #[arg(long, default_value_t = 5)]
    pub retry_interval: u64,

    /// Fail when the credentials provider cannot report a session expiration
    #[arg(long)]
    pub require_session_expiration: bool,

    // Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Also append diagnostics to this file
    #[arg(long)]
    pub log_file: Option<String>,
}

/// Non-empty name of the target cluster, sent in the signed request so the
/// token only verifies for that cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterName(String);

impl ClusterName {
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleArn(String);

impl RoleArn {
    // Empty means "sign as the ambient identity"
    pub fn new(arn: impl Into<String>) -> Option<Self> {
        let arn = arn.into();
        if arn.is_empty() {
            None
        } else {
            Some(Self(arn))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// When the AWS session behind a signed request stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExpiration {
    /// The credentials provider does not report an expiration.
    Unknown,
    Known(DateTime<Utc>),
}

impl From<Option<SystemTime>> for SessionExpiration {
    fn from(expiry: Option<SystemTime>) -> Self {
        match expiry {
            Some(at) => SessionExpiration::Known(at.into()),
            None => SessionExpiration::Unknown,
        }
    }
}

/// A presigned STS GetCallerIdentity URL and the expiration of the session
/// that signed it. The URL itself is valid for 15 minutes from signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub url: String,
    pub session_expiration: SessionExpiration,
}
