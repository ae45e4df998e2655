use chrono::Local;
use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io,
    path::Path,
    sync::Arc,
};
use tracing_subscriber::{
    fmt::{format::Writer, time::FormatTime},
    prelude::*,
    EnvFilter,
};

// stdout carries the exec credential, so diagnostics never go there.
const QUIET_DEPENDENCIES: &str = "aws_config=warn,aws_smithy_runtime=warn,hyper=warn,hyper_util=warn,rustls=warn";

/// Local wall-clock timestamps, same format the log files always used.
struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

fn default_filter(debug: bool) -> EnvFilter {
    let level = if debug { "debug" } else { "warn" };
    EnvFilter::new(format!("{},{}", level, QUIET_DEPENDENCIES))
}

fn open_log_file(log_file: &str) -> io::Result<File> {
    // Create log directory if it doesn't exist
    if let Some(parent) = Path::new(log_file).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(log_file)
}

/// Installs the global subscriber: stderr always, plus `log_file` when set.
/// `RUST_LOG` overrides the level picked from `debug`.
///
/// A log file that cannot be opened still leaves the stderr layer installed;
/// the open error is returned afterwards.
pub fn init_logging(debug: bool, log_file: Option<&str>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_timer(LocalTimestamp)
        .with_target(false);

    let (file, file_error) = match log_file.map(open_log_file) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let file_layer = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Arc::new(file))
            .with_timer(LocalTimestamp)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;

    match (file_error, log_file) {
        (Some(e), Some(path)) => Err(io::Error::new(
            e.kind(),
            format!("cannot open log file {}: {}", path, e),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_parent_is_created() {
        let dir = std::env::temp_dir().join(format!("argocd-k8s-auth-{}", std::process::id()));
        let path = dir.join("nested").join("auth.log");

        open_log_file(path.to_str().unwrap()).unwrap();
        assert!(path.exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn debug_flag_raises_the_level() {
        let directives = |debug| default_filter(debug).to_string();
        assert!(directives(true).split(',').any(|d| d == "debug"));
        assert!(directives(false).split(',').any(|d| d == "warn"));
        assert!(!directives(false).split(',').any(|d| d == "debug"));
    }
}
