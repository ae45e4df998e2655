// src/token/exec_credential.rs
use super::AuthError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const EXEC_CREDENTIAL_KIND: &str = "ExecCredential";
pub const EXEC_CREDENTIAL_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";

/// client.authentication.k8s.io/v1beta1 ExecCredential, the document an exec
/// plugin prints for client-go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCredential {
    pub kind: String,
    pub api_version: String,
    pub status: ExecCredentialStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCredentialStatus {
    pub expiration_timestamp: String,
    pub token: String,
}

impl ExecCredential {
    pub fn new(token: String, expiration: DateTime<Utc>) -> Self {
        Self {
            kind: EXEC_CREDENTIAL_KIND.to_string(),
            api_version: EXEC_CREDENTIAL_API_VERSION.to_string(),
            status: ExecCredentialStatus {
                expiration_timestamp: expiration.to_rfc3339_opts(SecondsFormat::Secs, true),
                token,
            },
        }
    }

    pub fn to_json(&self) -> Result<String, AuthError> {
        Ok(serde_json::to_string(self)?)
    }
}
