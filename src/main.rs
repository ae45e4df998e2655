// src/main.rs
mod config;
mod token;
mod types;
mod utils;

use config::AuthConfig;
use token::{AuthError, AwsRequestSigner, RequestSigner};
use types::Args;

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::debug;

/// Issues a credential and writes the document to `out` in one write, only
/// once every step has succeeded.
async fn run<S, W>(config: &AuthConfig, signer: &S, out: &mut W) -> Result<(), AuthError>
where
    S: RequestSigner + ?Sized,
    W: Write,
{
    let credential = token::issue_credential(signer, config).await?;
    let document = credential.to_json()?;

    out.write_all(document.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn report(err: &AuthError) {
    let message = match err.context() {
        Some(context) => format!("{}: {}", context, err),
        None => err.to_string(),
    };
    debug!(code = err.exit_code(), "exiting with error");

    // Some callers only surface stdout, so the message goes to both.
    eprintln!("{}", message);
    let _ = writeln!(io::stdout(), "{}", message);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    if let Err(e) = utils::logging::init_logging(args.debug, args.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match AuthConfig::from_args(&args) {
        Ok(config) => {
            let signer = AwsRequestSigner::new(config.region.clone());
            run(&config, &signer, &mut io::stdout().lock()).await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::error::SigningError;
    use crate::types::{ClusterName, RoleArn, SessionExpiration, SignedRequest};
    use async_trait::async_trait;
    use crate::token::ExecCredential;

    struct StubSigner {
        result: fn() -> Result<SignedRequest, SigningError>,
    }

    #[async_trait]
    impl RequestSigner for StubSigner {
        async fn sign(
            &self,
            _cluster: &ClusterName,
            _role: Option<&RoleArn>,
        ) -> Result<SignedRequest, SigningError> {
            (self.result)()
        }
    }

    fn signed() -> Result<SignedRequest, SigningError> {
        Ok(SignedRequest {
            url: "https://sts.amazonaws.com/?Action=GetCallerIdentity&Version=2011-06-15"
                .to_string(),
            session_expiration: SessionExpiration::Unknown,
        })
    }

    /// Counts writes and can be told to fail them.
    #[derive(Default)]
    struct RecordingWriter {
        buf: Vec<u8>,
        writes: usize,
        broken: bool,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            if self.broken {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"));
            }
            self.writes += 1;
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn config() -> AuthConfig {
        AuthConfig::new(ClusterName::new("prod").unwrap())
    }

    #[tokio::test]
    async fn writes_exactly_one_document() {
        let signer = StubSigner { result: signed };
        let mut out = RecordingWriter::default();

        run(&config(), &signer, &mut out).await.unwrap();

        assert_eq!(out.writes, 1);
        let stdout = String::from_utf8(out.buf).unwrap();
        assert!(!stdout.ends_with('\n'));

        let credential: ExecCredential = serde_json::from_str(&stdout).unwrap();
        assert_eq!(credential.kind, "ExecCredential");
        assert_eq!(credential.api_version, "client.authentication.k8s.io/v1beta1");
        assert!(credential.status.token.starts_with("k8s-aws-v1."));
    }

    #[tokio::test]
    async fn failed_write_maps_to_output_error() {
        let signer = StubSigner { result: signed };
        let mut out = RecordingWriter {
            broken: true,
            ..Default::default()
        };

        let err = run(&config(), &signer, &mut out).await.unwrap_err();

        assert!(matches!(err, AuthError::Output(_)));
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_written_when_signing_times_out() {
        let signer = StubSigner {
            result: || Err(SigningError::Credentials("access denied".to_string())),
        };
        let mut out = RecordingWriter::default();

        let err = run(&config(), &signer, &mut out).await.unwrap_err();

        assert!(matches!(err, AuthError::RetryTimeout { .. }));
        assert_eq!(err.exit_code(), 13);
        assert_eq!(out.writes, 0);
        assert!(out.buf.is_empty());
    }
}
