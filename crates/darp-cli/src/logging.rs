//! Tracing subscriber setup from the `logging` settings section.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use darp_config::{LogFormat, LoggingSettings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::CliError;

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
    /// A file, opened for append.
    File(String),
}

impl LogTarget {
    /// Interprets the `logging.output` setting.
    #[must_use]
    pub fn parse(output: &str) -> Self {
        match output.trim() {
            "stdout" => Self::Stdout,
            "stderr" | "" => Self::Stderr,
            path => Self::File(path.to_string()),
        }
    }
}

/// The filter level, with `--verbose` forcing debug.
#[must_use]
pub fn level_filter(settings: &LoggingSettings, verbose: bool) -> LevelFilter {
    if verbose {
        return LevelFilter::DEBUG;
    }
    settings
        .level
        .as_str()
        .parse()
        .unwrap_or(LevelFilter::INFO)
}

fn make_writer(target: &LogTarget) -> Result<(BoxMakeWriter, bool), CliError> {
    Ok(match target {
        LogTarget::Stdout => (BoxMakeWriter::new(io::stdout), true),
        LogTarget::Stderr => (BoxMakeWriter::new(io::stderr), true),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| CliError::Config(format!("cannot open log file {path}: {e}")))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    })
}

/// The same settings writing to stderr.
#[must_use]
pub fn stderr_fallback(settings: &LoggingSettings) -> LoggingSettings {
    LoggingSettings {
        output: "stderr".to_string(),
        ..settings.clone()
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the configured level.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init(settings: &LoggingSettings, verbose: bool) -> Result<(), CliError> {
    let filter = EnvFilter::builder()
        .with_default_directive(level_filter(settings, verbose).into())
        .from_env_lossy();
    let (writer, ansi) = make_writer(&LogTarget::parse(&settings.output))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false);

    let installed = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(ansi).try_init(),
    };
    installed.map_err(|e| CliError::Config(format!("failed to initialise logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use darp_config::LogLevel;

    #[test]
    fn log_target_parse() {
        assert_eq!(LogTarget::parse("stdout"), LogTarget::Stdout);
        assert_eq!(LogTarget::parse("stderr"), LogTarget::Stderr);
        assert_eq!(LogTarget::parse(""), LogTarget::Stderr);
        assert_eq!(
            LogTarget::parse("/var/log/darp.log"),
            LogTarget::File("/var/log/darp.log".into())
        );
    }

    #[test]
    fn verbose_forces_debug() {
        let settings = LoggingSettings {
            level: LogLevel::Error,
            ..LoggingSettings::default()
        };
        assert_eq!(level_filter(&settings, false), LevelFilter::ERROR);
        assert_eq!(level_filter(&settings, true), LevelFilter::DEBUG);
    }

    #[test]
    fn file_target_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("darp.log");
        let (_, ansi) = make_writer(&LogTarget::File(path.display().to_string())).unwrap();
        assert!(!ansi);
        assert!(path.exists());
    }

    #[test]
    fn unwritable_file_target_fails() {
        let result = make_writer(&LogTarget::File("/nonexistent-dir/darp.log".into()));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn stderr_fallback_keeps_level_and_format() {
        let settings = LoggingSettings {
            level: LogLevel::Warn,
            format: LogFormat::Text,
            output: "/nonexistent-dir/darp.log".into(),
        };
        let fallback = stderr_fallback(&settings);
        assert_eq!(LogTarget::parse(&fallback.output), LogTarget::Stderr);
        assert_eq!(fallback.level, LogLevel::Warn);
        assert_eq!(fallback.format, LogFormat::Text);
        assert!(make_writer(&LogTarget::parse(&fallback.output)).is_ok());
    }
}
