//! Structured logging setup using tracing
//!
//! Installs a global subscriber matching a resolved [`LoggerSection`]:
//! human-readable lines when pretty-printing is on, JSON lines otherwise.
//!
//! # Example
//!
//! ```no_run
//! use service_config::config::ServiceConfig;
//! use service_config::logging::init_logging;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::from_env()?;
//! init_logging(config.logger()?)?;
//!
//! tracing::info!("Application started");
//! # Ok(())
//! # }
//! ```

use crate::domain::errors::ServiceConfigError;
use crate::domain::result::Result;
use crate::logging::sink::{LogSink, LoggerSection, PrettyPrint};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Initialize the global subscriber from a logger section
///
/// A disabled section installs nothing. `RUST_LOG` overrides the section's
/// level when set.
///
/// # Errors
///
/// Returns [`ServiceConfigError::Logging`] if a global subscriber is already
/// installed.
pub fn init_logging(section: &LoggerSection) -> Result<()> {
    let sink = match section {
        LoggerSection::Disabled => return Ok(()),
        LoggerSection::Enabled(sink) => sink,
    };

    tracing_subscriber::registry()
        .with(build_layer(sink))
        .try_init()
        .map_err(|e| ServiceConfigError::Logging(e.to_string()))?;

    tracing::info!(
        min_level = %sink.level,
        pretty = matches!(sink.pretty_print, PrettyPrint::Enabled(_)),
        "Logging initialized"
    );

    Ok(())
}

/// Builds the filtered fmt layer for `sink`
pub fn build_layer(sink: &LogSink) -> Box<dyn Layer<Registry> + Send + Sync> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(sink.level).into())
        .from_env_lossy();

    match &sink.pretty_print {
        PrettyPrint::Enabled(options) => tracing_subscriber::fmt::layer()
            .with_ansi(options.colorize)
            .with_target(options.with_target)
            .with_thread_ids(options.with_thread_ids)
            .with_timer(ChronoLocal::new(options.translate_time.clone()))
            .with_writer(sink.make_writer())
            .with_filter(env_filter)
            .boxed(),
        PrettyPrint::Disabled => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(sink.make_writer())
            .with_filter(env_filter)
            .boxed(),
    }
}
