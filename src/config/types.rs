// config/types.rs
use crate::token::AuthError;
use crate::types::{Args, ClusterName, RoleArn};
use std::time::Duration;

pub const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);
// A client-go exec plugin that blocks for longer than this is never waited on.
pub const MAX_RETRY_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Fixed-interval retry budget for signing attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_RETRY_TIMEOUT,
            interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub cluster: ClusterName,
    pub role: Option<RoleArn>,
    pub region: Option<String>,
    pub retry: RetryPolicy,
    pub require_session_expiration: bool,
}

impl AuthConfig {
    pub fn new(cluster: ClusterName) -> Self {
        Self {
            cluster,
            role: None,
            region: None,
            retry: RetryPolicy::default(),
            require_session_expiration: false,
        }
    }

    pub fn from_args(args: &Args) -> Result<Self, AuthError> {
        let cluster =
            ClusterName::new(args.cluster_name.trim()).ok_or(AuthError::MissingClusterName)?;

        let mut config = Self::new(cluster);
        config.role = RoleArn::new(args.role_arn.trim());
        config.region = args
            .region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        config.retry = RetryPolicy {
            timeout: Duration::from_secs(args.retry_timeout),
            interval: Duration::from_secs(args.retry_interval),
        };
        config.require_session_expiration = args.require_session_expiration;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.retry.interval.is_zero() {
            return Err(AuthError::InvalidConfig(
                "retry interval must be greater than zero".to_string(),
            ));
        }
        if self.retry.timeout.is_zero() || self.retry.timeout > MAX_RETRY_TIMEOUT {
            return Err(AuthError::InvalidConfig(format!(
                "retry timeout must be between 1 and {} seconds",
                MAX_RETRY_TIMEOUT.as_secs()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> Result<AuthConfig, AuthError> {
        let args = Args::try_parse_from(argv).expect("arguments should parse");
        AuthConfig::from_args(&args)
    }

    #[test]
    fn defaults_match_the_plugin_contract() {
        let config = parse(&["argocd-k8s-auth", "--cluster-name", "prod"]).unwrap();
        assert_eq!(config.cluster.as_str(), "prod");
        assert!(config.role.is_none());
        assert!(config.region.is_none());
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.retry.timeout, Duration::from_secs(60));
        assert_eq!(config.retry.interval, Duration::from_secs(5));
        assert!(!config.require_session_expiration);
    }

    #[test]
    fn role_and_region_are_picked_up() {
        let config = parse(&[
            "argocd-k8s-auth",
            "--cluster-name=prod",
            "--role-arn=arn:aws:iam::123456789012:role/deployer",
            "--region=eu-west-1",
            "--retry-timeout=30",
            "--retry-interval=2",
        ])
        .unwrap();
        assert_eq!(
            config.role.as_ref().map(RoleArn::as_str),
            Some("arn:aws:iam::123456789012:role/deployer")
        );
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.retry.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.interval, Duration::from_secs(2));
    }

    #[test]
    fn missing_cluster_name_is_rejected() {
        let err = parse(&["argocd-k8s-auth"]).unwrap_err();
        assert!(matches!(err, AuthError::MissingClusterName));

        let err = parse(&["argocd-k8s-auth", "--cluster-name", "  "]).unwrap_err();
        assert!(matches!(err, AuthError::MissingClusterName));
    }

    #[test]
    fn empty_role_means_ambient_identity() {
        let config = parse(&["argocd-k8s-auth", "--cluster-name=prod", "--role-arn="]).unwrap();
        assert!(config.role.is_none());
    }

    #[test]
    fn zero_interval_is_invalid() {
        let err = parse(&["argocd-k8s-auth", "--cluster-name=prod", "--retry-interval=0"])
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidConfig(_)));
    }

    #[test]
    fn out_of_range_timeout_is_invalid() {
        for timeout in ["0", "86401", "18446744073709551615"] {
            let flag = format!("--retry-timeout={}", timeout);
            let err = parse(&["argocd-k8s-auth", "--cluster-name=prod", &flag]).unwrap_err();
            assert!(matches!(err, AuthError::InvalidConfig(_)), "{timeout}");
            assert_eq!(err.exit_code(), 26);
        }

        let config = parse(&["argocd-k8s-auth", "--cluster-name=prod", "--retry-timeout=86400"]);
        assert!(config.is_ok());
    }
}
