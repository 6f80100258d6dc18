//! Tracing setup for embedders.

use std::io;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// How log records are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

/// Install a global subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `level`. Span closings are logged, so
/// each `analyze_file` span reports its duration. Returns false when a
/// global subscriber was already installed.
pub fn init_tracing(level: Level, format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let installed = match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_writer(io::stderr)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .try_init(),
    };
    installed.is_ok()
}

/// [`init_tracing`] at `warn` in text form.
pub fn init_default_tracing() -> bool {
    init_tracing(Level::WARN, LogFormat::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        // The first call may race other tests; the second never installs.
        let _ = init_default_tracing();
        assert!(!init_tracing(Level::DEBUG, LogFormat::Json));
    }

    #[test]
    fn test_log_format_serde() {
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
        let format: LogFormat = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(format, LogFormat::Text);
    }
}
