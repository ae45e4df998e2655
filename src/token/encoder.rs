use base64::{engine::general_purpose, Engine as _};

pub const V1_PREFIX: &str = "k8s-aws-v1.";

/// Bearer token understood by the aws-iam-authenticator webhook: the prefix
/// followed by the presigned URL in unpadded URL-safe base64.
pub fn encode_token(presigned_url: &str) -> String {
    format!(
        "{}{}",
        V1_PREFIX,
        general_purpose::URL_SAFE_NO_PAD.encode(presigned_url.as_bytes())
    )
}
