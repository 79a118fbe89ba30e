//! Configuration sections for a backend service.
//!
//! [`ServiceConfig`] resolves each section on first access and caches it for
//! the lifetime of the instance. Sections derive from a layered key-value
//! source, from each other, and from a few local files.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use service_config::config::ServiceConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::from_env()?;
//!
//! println!("Environment: {}", config.environment().label());
//! println!("Application: {}", config.application()?.name);
//! println!("Kafka client: {}", config.kafka()?.client_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Sections
//!
//! - [`EnvironmentSection`] - runtime mode from `RUN_ENV`
//! - [`PackageInfoSection`] - name, version and description from the manifest
//! - [`ApplicationSection`] - identity, bind address, instance id, media types
//! - [`DatabaseSection`] - connection parameters, `database.*`
//! - [`LoggerSection`](crate::logging::LoggerSection) - log sink, `logger.*`
//! - [`SwaggerSection`] - API documentation, `documentation.*`
//! - [`KafkaSection`] - broker settings, `kafka.*`
//! - [`AuthSection`] - key pair from `keys/`, resolved asynchronously
//!
//! # Dependencies Between Sections
//!
//! ```text
//! PackageInfo -> Application -> Database (name default)
//!                            -> Swagger, Kafka, Auth (consumer group)
//! Environment -> Database, Logger, Kafka (defaults)
//! ```
//!
//! # Example Configuration
//!
//! `config/default.toml`:
//!
//! ```toml
//! port = 8080
//!
//! [database]
//! host = "db.internal"
//! user = "orders"
//! password = "change-me"
//!
//! [logger]
//! destination = "/var/log/orders/service.log"
//! level = "info"
//!
//! [kafka]
//! brokers = ["kafka-1:9092", "kafka-2:9092"]
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `SERVICE_` plus the key path, segments
//! joined by `__`:
//!
//! ```bash
//! export RUN_ENV=production
//! export SERVICE_DATABASE__PASSWORD="secret-password"
//! export SERVICE_KAFKA__BROKERS="kafka-1:9092,kafka-2:9092"
//! ```

pub mod keys;
pub mod manifest;
pub mod profile;
pub mod resolver;
pub mod schema;
pub mod secret;
pub mod source;

// Re-export commonly used types
pub use profile::{Environment, EnvironmentProfile};
pub use resolver::{ServiceConfig, ServiceConfigBuilder, MODE_VARIABLE};
pub use schema::{
    ApiDocument, ApiInfo, ApplicationSection, AuthKafka, AuthSection, Brokers, DatabaseSection,
    EnvironmentSection, KafkaSection, PackageInfoSection, SwaggerSection,
};
pub use secret::{key_material, secret_string, KeyMaterial, SecretString, SecretValue};
pub use source::{load_source, load_source_from, ConfigSource};
