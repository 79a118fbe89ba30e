//! Logger section and its output handle
//!
//! A resolved logger section is either disabled or a [`LogSink`]. File sinks
//! open their destination once, in append mode, and keep it open for as long
//! as the section lives. Writes go through a non-blocking worker so a slow or
//! failing disk never blocks or fails the caller.

use crate::domain::errors::ServiceConfigError;
use crate::domain::result::Result;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Default log file, relative to the base directory
pub const DEFAULT_LOG_DESTINATION: &str = ".logs";

/// Default timestamp format for pretty-printed output
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Resolved logger configuration
#[derive(Debug, Clone)]
pub enum LoggerSection {
    /// Logging is switched off
    Disabled,
    /// Logging goes to the given sink
    Enabled(LogSink),
}

impl LoggerSection {
    pub fn is_enabled(&self) -> bool {
        matches!(self, LoggerSection::Enabled(_))
    }

    /// The sink, if logging is enabled
    pub fn sink(&self) -> Option<&LogSink> {
        match self {
            LoggerSection::Disabled => None,
            LoggerSection::Enabled(sink) => Some(sink),
        }
    }
}

/// Structured log sink descriptor
#[derive(Debug, Clone)]
pub struct LogSink {
    pub destination: LogDestination,
    pub pretty_print: PrettyPrint,

    /// Minimum severity
    pub level: Level,
}

impl LogSink {
    /// Writer factory for a `tracing-subscriber` fmt layer
    pub fn make_writer(&self) -> BoxMakeWriter {
        match &self.destination {
            LogDestination::Console => BoxMakeWriter::new(std::io::stdout),
            LogDestination::File(file) => BoxMakeWriter::new(file.writer()),
        }
    }
}

/// Where log lines are written
#[derive(Debug, Clone)]
pub enum LogDestination {
    Console,
    File(LogFile),
}

/// Append-only log file held open for the lifetime of the section
#[derive(Clone)]
pub struct LogFile {
    path: PathBuf,
    writer: NonBlocking,
    _guard: Arc<WorkerGuard>,
}

impl LogFile {
    /// Opens `path` for appending, creating it and its parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceConfigError::LogDestination`] if the file cannot be
    /// created or opened.
    pub fn open(path: &Path) -> Result<Self> {
        let destination_error = |reason: String| ServiceConfigError::LogDestination {
            path: path.to_path_buf(),
            reason,
        };

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| destination_error("path has no file name".to_string()))?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        std::fs::create_dir_all(directory).map_err(|e| destination_error(e.to_string()))?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(directory)
            .map_err(|e| destination_error(e.to_string()))?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        tracing::debug!(path = %path.display(), "Log file opened");

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            _guard: Arc::new(guard),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle for writing to the file
    ///
    /// Writes never return an error; lines are dropped if the worker falls
    /// behind.
    pub fn writer(&self) -> NonBlocking {
        self.writer.clone()
    }
}

impl fmt::Debug for LogFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFile").field("path", &self.path).finish()
    }
}

/// Human-readable output settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrettyPrint {
    /// Machine-readable JSON lines
    Disabled,
    /// Human-readable lines
    Enabled(PrettyPrintOptions),
}

/// Options for human-readable output
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrettyPrintOptions {
    /// ANSI colours
    pub colorize: bool,

    /// `chrono` format string for timestamps
    pub translate_time: String,

    /// Include the event target
    pub with_target: bool,

    /// Include thread ids
    pub with_thread_ids: bool,
}

impl Default for PrettyPrintOptions {
    fn default() -> Self {
        Self {
            colorize: true,
            translate_time: DEFAULT_TIME_FORMAT.to_string(),
            with_target: true,
            with_thread_ids: false,
        }
    }
}

/// `logger.pretty_print` as written in configuration: a flag or an options table
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PrettyPrintSetting {
    Flag(bool),
    Options(PrettyPrintOptions),
}

impl From<PrettyPrintSetting> for PrettyPrint {
    fn from(setting: PrettyPrintSetting) -> Self {
        match setting {
            PrettyPrintSetting::Flag(true) => PrettyPrint::Enabled(PrettyPrintOptions::default()),
            PrettyPrintSetting::Flag(false) => PrettyPrint::Disabled,
            PrettyPrintSetting::Options(options) => PrettyPrint::Enabled(options),
        }
    }
}

/// Parse log level from string
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ServiceConfigError::InvalidValue {
            key: "logger.level".to_string(),
            reason: format!("{level_str} is not one of: trace, debug, info, warn, error"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_parse_log_level_valid() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
    }

    #[test]
    fn test_parse_log_level_case_insensitive() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("Info").unwrap(), Level::INFO);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        let err = parse_log_level("verbose").unwrap_err();
        assert!(err.to_string().contains("logger.level"));
    }

    #[test]
    fn test_pretty_print_setting_conversion() {
        assert_eq!(
            PrettyPrint::from(PrettyPrintSetting::Flag(false)),
            PrettyPrint::Disabled
        );
        assert_eq!(
            PrettyPrint::from(PrettyPrintSetting::Flag(true)),
            PrettyPrint::Enabled(PrettyPrintOptions::default())
        );
    }

    #[test]
    fn test_pretty_print_options_partial() {
        let setting: PrettyPrintSetting =
            serde_json::from_str(r#"{"colorize": false}"#).unwrap();
        match PrettyPrint::from(setting) {
            PrettyPrint::Enabled(options) => {
                assert!(!options.colorize);
                assert_eq!(options.translate_time, DEFAULT_TIME_FORMAT);
            }
            PrettyPrint::Disabled => panic!("expected enabled pretty print"),
        }
    }

    #[test]
    fn test_log_file_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(".logs");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "existing\n").unwrap();

        {
            let file = LogFile::open(&path).unwrap();
            assert_eq!(file.path(), path.as_path());
            let mut writer = file.writer();
            writer.write_all(b"appended\n").unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "existing\nappended\n");
    }

    #[test]
    fn test_disabled_section_has_no_sink() {
        let section = LoggerSection::Disabled;
        assert!(!section.is_enabled());
        assert!(section.sink().is_none());
    }
}
