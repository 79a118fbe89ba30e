//! Runtime environment classification and the per-environment defaults table
//!
//! Every environment-sensitive default (database credentials, logger
//! behaviour, Kafka brokers) lives in [`EnvironmentProfile`], so section
//! derivations look values up here instead of branching on the environment
//! themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::Level;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    #[default]
    Development,
    /// Test environment
    Test,
}

impl Environment {
    /// Classifies a raw mode string by prefix.
    ///
    /// `prod*` is production, `test*` is test, anything else (including an
    /// unset variable) is development. Matching is case-insensitive.
    pub fn classify(raw: Option<&str>) -> Self {
        let normalized = raw.map(|s| s.trim().to_lowercase()).unwrap_or_default();
        if normalized.starts_with("prod") {
            Environment::Production
        } else if normalized.starts_with("test") {
            Environment::Test
        } else {
            Environment::Development
        }
    }

    /// Canonical lowercase label
    pub fn label(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Test => "test",
        }
    }

    /// Default values for this environment
    pub fn profile(&self) -> &'static EnvironmentProfile {
        match self {
            Environment::Production => &PRODUCTION,
            Environment::Development => &DEVELOPMENT,
            Environment::Test => &TEST,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Database defaults for an environment
///
/// `None` means the value has no default and must come from the config
/// source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseDefaults {
    pub host: Option<&'static str>,
    pub port: u16,
    pub user: Option<&'static str>,
    pub password: Option<&'static str>,
}

/// Where log output goes by default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerProfile {
    /// No logging at all
    Disabled,
    /// Console output
    Console { pretty_print: bool, level: Level },
    /// Append-only file output
    File { pretty_print: bool, level: Level },
}

/// Kafka broker defaults for an environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerDefaults {
    /// No default, brokers stay unset unless configured
    Unset,
    /// Empty broker list
    Empty,
    /// Fixed broker list
    List(&'static [&'static str]),
}

/// Environment-dependent defaults consumed by the section derivations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentProfile {
    pub database: DatabaseDefaults,
    pub logger: LoggerProfile,
    pub brokers: BrokerDefaults,
}

/// Default PostgreSQL port
pub const DEFAULT_DATABASE_PORT: u16 = 5432;

const LOCAL_CONTAINER_DATABASE: DatabaseDefaults = DatabaseDefaults {
    host: Some("postgres_container"),
    port: DEFAULT_DATABASE_PORT,
    user: Some("postgres"),
    password: Some("postgres"),
};

static PRODUCTION: EnvironmentProfile = EnvironmentProfile {
    database: DatabaseDefaults {
        host: None,
        port: DEFAULT_DATABASE_PORT,
        user: None,
        password: None,
    },
    logger: LoggerProfile::File {
        pretty_print: false,
        level: Level::INFO,
    },
    brokers: BrokerDefaults::Unset,
};

static DEVELOPMENT: EnvironmentProfile = EnvironmentProfile {
    database: LOCAL_CONTAINER_DATABASE,
    logger: LoggerProfile::Console {
        pretty_print: true,
        level: Level::DEBUG,
    },
    brokers: BrokerDefaults::List(&["localhost:9092"]),
};

static TEST: EnvironmentProfile = EnvironmentProfile {
    database: LOCAL_CONTAINER_DATABASE,
    logger: LoggerProfile::Disabled,
    brokers: BrokerDefaults::Empty,
};
