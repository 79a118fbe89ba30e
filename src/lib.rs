// Service Config - lazily resolved configuration for backend services
// Copyright (c) 2025 Service Config Contributors
// Licensed under the MIT License

//! # Service Config
//!
//! A lazily evaluated, memoized configuration façade for a backend service.
//!
//! ## Overview
//!
//! One [`config::ServiceConfig`] instance exposes typed sections (environment,
//! package info, application, database, logger, API documentation, Kafka,
//! auth keys). Each section is derived on first access from:
//! - a layered key-value source (`config/*` files, `SERVICE_*` variables)
//! - sibling sections (the database name defaults to the application name)
//! - local files (package manifest, key pair)
//!
//! and cached for the lifetime of the instance.
//!
//! ## Architecture
//!
//! - [`config`] - Sections, the resolver and configuration sources
//! - [`logging`] - Logger section and subscriber setup
//! - [`domain`] - Error type and result alias
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use service_config::config::ServiceConfig;
//! use service_config::logging::init_logging;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::from_env()?;
//!     init_logging(config.logger()?)?;
//!
//!     let application = config.application()?;
//!     tracing::info!(name = %application.name, port = application.port, "Starting");
//!
//!     let auth = config.auth().await?;
//!     tracing::info!(signing = auth.can_sign(), "Keys loaded");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every accessor returns [`domain::Result`]. Errors name the missing key or
//! unreadable file:
//!
//! ```rust,no_run
//! use service_config::config::ServiceConfig;
//! use service_config::domain::ServiceConfigError;
//!
//! let config = ServiceConfig::builder().environment("production").build();
//! match config.database() {
//!     Err(ServiceConfigError::MissingRequiredKey { key }) => eprintln!("set {key}"),
//!     Err(e) => eprintln!("{e}"),
//!     Ok(database) => println!("{}", database.host),
//! }
//! ```

pub mod config;
pub mod domain;
pub mod logging;
