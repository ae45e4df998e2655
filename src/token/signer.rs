// src/token/signer.rs
use super::error::{error_chain, SigningError};
use crate::types::{ClusterName, RoleArn, SessionExpiration, SignedRequest};
use async_trait::async_trait;
use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{
    self, SignableBody, SignableRequest, SignatureLocation, SigningParams, SigningSettings,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use std::time::{Duration, SystemTime};
use tracing::debug;
use url::Url;

pub const CLUSTER_ID_HEADER: &str = "x-k8s-aws-id";

// STS honours GetCallerIdentity presigned urls for 15 minutes after signing no
// matter what X-Amz-Expires says. Servers from aws-iam-authenticator 0.3.0 and
// earlier only accept values between 0 and 60, so it stays pinned at 60.
pub const REQUEST_PRESIGN_PARAM: Duration = Duration::from_secs(60);

const STS_SERVICE: &str = "sts";
const GLOBAL_STS_HOST: &str = "sts.amazonaws.com";
const GLOBAL_SIGNING_REGION: &str = "us-east-1";

#[async_trait]
pub trait RequestSigner: Send + Sync {
    /// Presigns an STS GetCallerIdentity request bound to `cluster`, assuming
    /// `role` first when one is given.
    async fn sign(
        &self,
        cluster: &ClusterName,
        role: Option<&RoleArn>,
    ) -> Result<SignedRequest, SigningError>;
}

/// STS endpoint and the region its requests are signed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StsEndpoint {
    host: String,
    signing_region: String,
}

impl StsEndpoint {
    /// Regional endpoint when a region is known, the global one otherwise.
    pub fn for_region(region: Option<&str>) -> Self {
        match region {
            Some(region) if region.starts_with("cn-") => Self {
                host: format!("sts.{}.amazonaws.com.cn", region),
                signing_region: region.to_string(),
            },
            Some(region) => Self {
                host: format!("sts.{}.amazonaws.com", region),
                signing_region: region.to_string(),
            },
            None => Self {
                host: GLOBAL_STS_HOST.to_string(),
                signing_region: GLOBAL_SIGNING_REGION.to_string(),
            },
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn signing_region(&self) -> &str {
        &self.signing_region
    }

    fn caller_identity_url(&self) -> Result<Url, SigningError> {
        let mut url = Url::parse(&format!("https://{}/", self.host))
            .map_err(|e| SigningError::InvalidRequest(format!("{}: {}", self.host, e)))?;
        url.query_pairs_mut()
            .append_pair("Action", "GetCallerIdentity")
            .append_pair("Version", "2011-06-15");
        Ok(url)
    }
}

/// Presigns `GET /?Action=GetCallerIdentity` with SigV4, signature in the
/// query string and the cluster header among the signed headers.
pub fn presign_caller_identity(
    credentials: &Credentials,
    endpoint: &StsEndpoint,
    cluster: &ClusterName,
    time: SystemTime,
) -> Result<String, SigningError> {
    let mut settings = SigningSettings::default();
    settings.expires_in = Some(REQUEST_PRESIGN_PARAM);
    settings.signature_location = SignatureLocation::QueryParams;

    let identity = Identity::from(credentials.clone());
    let params = v4::SigningParams::builder()
        .identity(&identity)
        .region(endpoint.signing_region())
        .name(STS_SERVICE)
        .time(time)
        .settings(settings)
        .build()
        .map_err(|e| SigningError::Presign(e.to_string()))?;

    let url = endpoint.caller_identity_url()?;
    let signable = SignableRequest::new(
        "GET",
        url.as_str(),
        std::iter::once((CLUSTER_ID_HEADER, cluster.as_str())),
        SignableBody::Bytes(&[]),
    )
    .map_err(|e| SigningError::Presign(error_chain(&e)))?;

    let (instructions, _signature) = http_request::sign(signable, &SigningParams::V4(params))
        .map_err(|e| SigningError::Presign(error_chain(&e)))?
        .into_parts();

    let mut request = http::Request::builder()
        .method("GET")
        .uri(url.as_str())
        .header(CLUSTER_ID_HEADER, cluster.as_str())
        .body(())
        .map_err(|e| SigningError::InvalidRequest(e.to_string()))?;
    instructions.apply_to_request_http1x(&mut request);

    Ok(request.uri().to_string())
}

/// Signs with whatever the AWS default provider chain resolves, optionally
/// wrapped in an STS AssumeRole provider.
#[derive(Debug, Clone, Default)]
pub struct AwsRequestSigner {
    region_override: Option<String>,
}

impl AwsRequestSigner {
    pub fn new(region_override: Option<String>) -> Self {
        Self { region_override }
    }

    async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region_override {
            loader = loader.region(Region::new(region.clone()));
        }
        loader.load().await
    }

    async fn resolve_credentials(
        &self,
        sdk_config: &SdkConfig,
        endpoint: &StsEndpoint,
        role: Option<&RoleArn>,
    ) -> Result<Credentials, SigningError> {
        let resolved = match role {
            Some(role) => {
                debug!(role = %role, "assuming role before signing");
                let provider = AssumeRoleProvider::builder(role.as_str())
                    .configure(sdk_config)
                    .region(Region::new(endpoint.signing_region().to_string()))
                    .build()
                    .await;
                provider.provide_credentials().await
            }
            None => {
                let provider = sdk_config.credentials_provider().ok_or_else(|| {
                    SigningError::Credentials("no AWS credentials provider configured".to_string())
                })?;
                provider.provide_credentials().await
            }
        };
        resolved.map_err(|e| SigningError::Credentials(error_chain(&e)))
    }
}

#[async_trait]
impl RequestSigner for AwsRequestSigner {
    async fn sign(
        &self,
        cluster: &ClusterName,
        role: Option<&RoleArn>,
    ) -> Result<SignedRequest, SigningError> {
        let sdk_config = self.load_sdk_config().await;
        let endpoint = StsEndpoint::for_region(sdk_config.region().map(|r| r.as_ref()));
        debug!(
            host = endpoint.host(),
            region = endpoint.signing_region(),
            cluster = %cluster,
            "signing STS GetCallerIdentity request"
        );

        let credentials = self.resolve_credentials(&sdk_config, &endpoint, role).await?;
        let url = presign_caller_identity(&credentials, &endpoint, cluster, SystemTime::now())?;

        let session_expiration = SessionExpiration::from(credentials.expiry());
        if session_expiration == SessionExpiration::Unknown {
            // Nothing tells us whether the session outlives the presigned url.
            debug!("credentials provider does not report a session expiration");
        }

        Ok(SignedRequest {
            url,
            session_expiration,
        })
    }
}
