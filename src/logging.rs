//! Logging setup
//!
//! Logs go to stderr so stdout stays a clean JSON document.

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Output format of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Installs the global subscriber
///
/// `level` is the default directive (`error`, `warn`, `info`, `debug`, `trace`, `off`);
/// `RUST_LOG` overrides it when set.
pub fn init(level: &str, format: LogFormat) -> anyhow::Result<()> {
    let level: LevelFilter = level.parse()?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Text => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_level() {
        assert!(init("chatty", LogFormat::Text).is_err());
    }

    #[test]
    fn test_second_init_fails_instead_of_panicking() {
        // Whichever test installs first wins; the other call must report an error
        let first = init("warn", LogFormat::Json);
        let second = init("warn", LogFormat::Text);
        assert!(first.is_err() || second.is_err());
    }
}
