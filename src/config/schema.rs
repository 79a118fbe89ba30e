//! Resolved configuration section types
//!
//! Each section is an immutable value once resolved. The logger section lives
//! in [`crate::logging`] because it owns an open output handle.

use crate::config::profile::{BrokerDefaults, Environment};
use crate::config::secret::{KeyMaterial, SecretString};
use serde::{Deserialize, Serialize};

/// Runtime environment section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvironmentSection {
    /// Classified environment
    pub environment: Environment,
}

impl EnvironmentSection {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_test(&self) -> bool {
        self.environment == Environment::Test
    }

    /// Canonical label (`production`, `development` or `test`)
    pub fn label(&self) -> &'static str {
        self.environment.label()
    }
}

/// Identity read from the package manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfoSection {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Application identity and network binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationSection {
    pub name: String,
    pub version: String,
    pub description: String,

    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Process instance identifier, random and stable for the process lifetime
    pub pid: String,

    /// Accepted media types
    pub consumes: Vec<String>,

    /// Produced media types
    pub produces: Vec<String>,
}

/// Database connection parameters
#[derive(Debug, Clone)]
pub struct DatabaseSection {
    /// Database name, defaults to the application name
    pub database: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub migrations_directory: Option<String>,
}

/// API documentation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwaggerSection {
    /// Route the documentation UI is mounted on
    pub route_prefix: String,

    /// Whether the documentation route is exposed
    pub expose_route: bool,

    /// API description document
    pub openapi: ApiDocument,
}

/// OpenAPI description document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiDocument {
    /// OpenAPI version tag
    pub openapi: String,

    pub info: ApiInfo,

    /// Public host the API is served from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    pub consumes: Vec<String>,
    pub produces: Vec<String>,
}

/// `info` block of the API description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiInfo {
    pub title: String,
    pub description: String,
    pub version: String,
}

/// Kafka broker addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "addresses", rename_all = "lowercase")]
pub enum Brokers {
    /// Not configured, expected to be discovered at runtime
    Unset,
    /// Explicitly no brokers
    Empty,
    /// Broker addresses (`host:port`)
    List(Vec<String>),
}

impl Brokers {
    /// Builds a broker value from a configured list
    pub fn from_list(addresses: Vec<String>) -> Self {
        if addresses.is_empty() {
            Brokers::Empty
        } else {
            Brokers::List(addresses)
        }
    }

    /// Broker addresses, `None` when unset
    pub fn addresses(&self) -> Option<&[String]> {
        match self {
            Brokers::Unset => None,
            Brokers::Empty => Some(&[][..]),
            Brokers::List(addresses) => Some(addresses),
        }
    }
}

impl From<BrokerDefaults> for Brokers {
    fn from(defaults: BrokerDefaults) -> Self {
        match defaults {
            BrokerDefaults::Unset => Brokers::Unset,
            BrokerDefaults::Empty => Brokers::Empty,
            BrokerDefaults::List(addresses) => {
                Brokers::List(addresses.iter().map(|a| a.to_string()).collect())
            }
        }
    }
}

/// Messaging broker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KafkaSection {
    /// Client identifier, always the application name
    pub client_id: String,
    pub brokers: Brokers,
    pub group_id: String,
}

/// Consumer group settings carried by the auth section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthKafka {
    pub group_id: String,
}

/// Key pair used to verify and sign tokens
#[derive(Debug, Clone)]
pub struct AuthSection {
    pub public_key: KeyMaterial,

    /// Absent on services without signing capability
    pub private_key: Option<KeyMaterial>,

    pub kafka: AuthKafka,
}

impl AuthSection {
    /// Whether this service can sign tokens
    pub fn can_sign(&self) -> bool {
        self.private_key.is_some()
    }
}
