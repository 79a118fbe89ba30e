//! Logging section and observability
//!
//! The logger section decides where a service's log lines go:
//! - **test**: nowhere, the section is [`LoggerSection::Disabled`]
//! - **development**: console, pretty-printed, debug level
//! - **production**: append-only file (`logger.destination`, default `.logs`),
//!   JSON lines, info level
//!
//! # Example
//!
//! ```no_run
//! use service_config::config::ServiceConfig;
//! use service_config::logging::{init_logging, LoggerSection};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::from_env()?;
//! match config.logger()? {
//!     LoggerSection::Disabled => {}
//!     section => init_logging(section)?,
//! }
//! # Ok(())
//! # }
//! ```

pub mod sink;
pub mod structured;

pub use sink::{
    parse_log_level, LogDestination, LogFile, LogSink, LoggerSection, PrettyPrint,
    PrettyPrintOptions, PrettyPrintSetting, DEFAULT_LOG_DESTINATION,
};
pub use structured::{build_layer, init_logging};

/// Log the resolution of a configuration section
#[macro_export]
macro_rules! log_section_resolved {
    ($section:expr) => {
        tracing::debug!(section = $section, "Configuration section resolved");
    };
}

/// Log a failed section resolution
#[macro_export]
macro_rules! log_section_failed {
    ($section:expr, $error:expr) => {
        tracing::warn!(
            section = $section,
            error = %$error,
            "Configuration section failed to resolve"
        );
    };
}
