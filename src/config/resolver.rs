//! Demand-driven, memoized section resolution
//!
//! [`ServiceConfig`] exposes one accessor per section. The first call runs the
//! section's derivation and caches the result; later calls return the cached
//! value, even if files or environment changed in between. Each section is
//! resolved at most once, also under concurrent first access. Failed
//! derivations are not cached, so the next access tries again.

use crate::config::keys::load_key_pair;
use crate::config::manifest::{read_manifest, DEFAULT_MANIFEST, DEFAULT_VERSION};
use crate::config::profile::{Environment, LoggerProfile};
use crate::config::schema::{
    ApiDocument, ApiInfo, ApplicationSection, AuthKafka, AuthSection, Brokers, DatabaseSection,
    EnvironmentSection, KafkaSection, PackageInfoSection, SwaggerSection,
};
use crate::config::secret::secret_string;
use crate::config::source::{
    load_source, read, read_list, require, require_or_else, ConfigSource,
};
use crate::domain::errors::ServiceConfigError;
use crate::domain::result::Result;
use crate::logging::sink::{
    parse_log_level, LogDestination, LogFile, LogSink, LoggerSection, PrettyPrint,
    PrettyPrintSetting, DEFAULT_LOG_DESTINATION,
};
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

/// Environment variable selecting the runtime mode
pub const MODE_VARIABLE: &str = "RUN_ENV";

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 8080;

/// Default media type for `consumes` / `produces`
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Default documentation route
pub const DEFAULT_ROUTE_PREFIX: &str = "/documentation";

/// Default OpenAPI version tag
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.3";

/// Process environment lookup
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lazily resolved service configuration
///
/// Construct once at startup and share it (`&ServiceConfig` or
/// `Arc<ServiceConfig>`) with everything that needs configuration.
///
/// # Example
///
/// ```no_run
/// use service_config::config::ServiceConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServiceConfig::from_env()?;
///
/// let application = config.application()?;
/// println!("{} listening on {}:{}", application.name, application.host, application.port);
///
/// let database = config.database()?;
/// println!("database {} on {}", database.database, database.host);
///
/// let auth = config.auth().await?;
/// println!("signing enabled: {}", auth.can_sign());
/// # Ok(())
/// # }
/// ```
pub struct ServiceConfig {
    source: Box<dyn ConfigSource>,
    base_dir: PathBuf,
    manifest_path: PathBuf,
    mode_variable: String,
    env_lookup: EnvLookup,

    environment: OnceCell<EnvironmentSection>,
    package_info: OnceCell<PackageInfoSection>,
    application: OnceCell<ApplicationSection>,
    database: OnceCell<DatabaseSection>,
    logger: OnceCell<LoggerSection>,
    swagger: OnceCell<SwaggerSection>,
    kafka: OnceCell<KafkaSection>,
    auth: tokio::sync::OnceCell<AuthSection>,
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Builds the configuration for the current process.
    ///
    /// Loads `.env` if present, resolves the environment section from
    /// `RUN_ENV`, then layers `config/*` files and `SERVICE_*` variables from
    /// the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory is unavailable or a config
    /// file cannot be parsed.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let base_dir = std::env::current_dir().map_err(|e| {
            ServiceConfigError::Configuration(format!("Failed to read working directory: {e}"))
        })?;

        let mut config = Self::builder().base_dir(base_dir.clone()).build();
        let environment = config.environment().environment;
        config.source = Box::new(load_source(&base_dir, environment)?);

        Ok(config)
    }

    /// Directory key files, the manifest and relative log paths resolve against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Underlying key-value source
    pub fn source(&self) -> &dyn ConfigSource {
        self.source.as_ref()
    }

    /// Runtime environment
    pub fn environment(&self) -> &EnvironmentSection {
        self.environment.get_or_init(|| {
            let raw = (self.env_lookup)(&self.mode_variable);
            let section = EnvironmentSection {
                environment: Environment::classify(raw.as_deref()),
            };
            tracing::debug!(
                section = "environment",
                environment = %section.environment,
                "Configuration section resolved"
            );
            section
        })
    }

    /// Package manifest identity
    pub fn package_info(&self) -> Result<&PackageInfoSection> {
        self.package_info.get_or_try_init(|| {
            resolve("package_info", || read_manifest(&self.manifest_path))
        })
    }

    /// Application identity and binding
    pub fn application(&self) -> Result<&ApplicationSection> {
        self.application
            .get_or_try_init(|| resolve("application", || self.derive_application()))
    }

    /// Database connection parameters
    pub fn database(&self) -> Result<&DatabaseSection> {
        self.database
            .get_or_try_init(|| resolve("database", || self.derive_database()))
    }

    /// Logger configuration; opens the log file on first access in production
    pub fn logger(&self) -> Result<&LoggerSection> {
        self.logger
            .get_or_try_init(|| resolve("logger", || self.derive_logger()))
    }

    /// API documentation settings
    pub fn swagger(&self) -> Result<&SwaggerSection> {
        self.swagger
            .get_or_try_init(|| resolve("swagger", || self.derive_swagger()))
    }

    /// Messaging broker settings
    pub fn kafka(&self) -> Result<&KafkaSection> {
        self.kafka
            .get_or_try_init(|| resolve("kafka", || self.derive_kafka()))
    }

    /// Key pair, read from `keys/` on first access
    pub async fn auth(&self) -> Result<&AuthSection> {
        self.auth
            .get_or_try_init(|| async {
                let derived = self.derive_auth().await;
                resolve("auth", || derived)
            })
            .await
    }

    fn derive_application(&self) -> Result<ApplicationSection> {
        let source = self.source();

        let identity = match read::<String>(source, "name")? {
            Some(name) => PackageInfoSection {
                version: require(source, "version", Some(DEFAULT_VERSION.to_string()))?,
                description: require(source, "description", Some(format!("{name} service")))?,
                name,
            },
            None => {
                let info = self.package_info()?;
                PackageInfoSection {
                    name: info.name.clone(),
                    version: require(source, "version", Some(info.version.clone()))?,
                    description: require(source, "description", Some(info.description.clone()))?,
                }
            }
        };

        let media_types = |key: &str| -> Result<Vec<String>> {
            Ok(read_list(source, key)?.unwrap_or_else(|| vec![DEFAULT_MEDIA_TYPE.to_string()]))
        };

        Ok(ApplicationSection {
            name: identity.name,
            version: identity.version,
            description: identity.description,
            host: require(source, "host", Some(DEFAULT_HOST.to_string()))?,
            port: require(source, "port", Some(DEFAULT_PORT))?,
            pid: Uuid::new_v4().to_string(),
            consumes: media_types("consumes")?,
            produces: media_types("produces")?,
        })
    }

    fn derive_database(&self) -> Result<DatabaseSection> {
        let source = self.source();
        let defaults = self.environment().environment.profile().database;
        let owned = |value: Option<&str>| value.map(str::to_string);

        Ok(DatabaseSection {
            database: require_or_else(source, "database.database", || {
                Ok(self.application()?.name.clone())
            })?,
            host: require(source, "database.host", owned(defaults.host))?,
            port: require(source, "database.port", Some(defaults.port))?,
            user: require(source, "database.user", owned(defaults.user))?,
            password: secret_string(require(
                source,
                "database.password",
                owned(defaults.password),
            )?),
            migrations_directory: read(source, "database.migrations_directory")?,
        })
    }

    fn derive_logger(&self) -> Result<LoggerSection> {
        let (pretty_print, level, file_output) = match self.environment().environment.profile().logger
        {
            LoggerProfile::Disabled => return Ok(LoggerSection::Disabled),
            LoggerProfile::Console {
                pretty_print,
                level,
            } => (pretty_print, level, false),
            LoggerProfile::File {
                pretty_print,
                level,
            } => (pretty_print, level, true),
        };

        let destination = if file_output {
            let path: String = require(
                self.source(),
                "logger.destination",
                Some(DEFAULT_LOG_DESTINATION.to_string()),
            )?;
            LogDestination::File(LogFile::open(&self.base_dir.join(path))?)
        } else {
            LogDestination::Console
        };

        Ok(LoggerSection::Enabled(LogSink {
            destination,
            pretty_print: self.pretty_print(pretty_print)?,
            level: self.log_level(level)?,
        }))
    }

    fn pretty_print(&self, default_enabled: bool) -> Result<PrettyPrint> {
        let key = "logger.pretty_print";
        // Flags may arrive as strings from the environment
        let setting = match self.source().lookup(key) {
            Some(value) => match value.try_deserialize::<bool>() {
                Ok(flag) => PrettyPrintSetting::Flag(flag),
                Err(_) => PrettyPrintSetting::Options(require(self.source(), key, None)?),
            },
            None if default_enabled => PrettyPrintSetting::Flag(true),
            None => PrettyPrintSetting::Flag(false),
        };
        Ok(setting.into())
    }

    fn log_level(&self, default: Level) -> Result<Level> {
        match read::<String>(self.source(), "logger.level")? {
            Some(level) => parse_log_level(&level),
            None => Ok(default),
        }
    }

    fn derive_swagger(&self) -> Result<SwaggerSection> {
        let source = self.source();
        let application = self.application()?;

        Ok(SwaggerSection {
            route_prefix: require(
                source,
                "documentation.route_prefix",
                Some(DEFAULT_ROUTE_PREFIX.to_string()),
            )?,
            expose_route: require(source, "documentation.expose_route", Some(true))?,
            openapi: ApiDocument {
                openapi: require(
                    source,
                    "documentation.openapi",
                    Some(DEFAULT_OPENAPI_VERSION.to_string()),
                )?,
                info: ApiInfo {
                    title: format!("{} API", application.name),
                    description: application.description.clone(),
                    version: application.version.clone(),
                },
                host: read(source, "documentation.host")?,
                consumes: application.consumes.clone(),
                produces: application.produces.clone(),
            },
        })
    }

    fn derive_kafka(&self) -> Result<KafkaSection> {
        let application = self.application()?;
        let brokers = match read_list(self.source(), "kafka.brokers")? {
            Some(addresses) => Brokers::from_list(addresses),
            None => self.environment().environment.profile().brokers.into(),
        };

        Ok(KafkaSection {
            client_id: application.name.clone(),
            brokers,
            group_id: self.consumer_group_id()?,
        })
    }

    async fn derive_auth(&self) -> Result<AuthSection> {
        let group_id = self.consumer_group_id()?;
        let keys = load_key_pair(&self.base_dir).await?;

        Ok(AuthSection {
            public_key: keys.public_key,
            private_key: keys.private_key,
            kafka: AuthKafka { group_id },
        })
    }

    /// `kafka.group_id`, defaulting to `<name>_<pid>`
    fn consumer_group_id(&self) -> Result<String> {
        require_or_else(self.source(), "kafka.group_id", || {
            let application = self.application()?;
            Ok(format!("{}_{}", application.name, application.pid))
        })
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("base_dir", &self.base_dir)
            .field("manifest_path", &self.manifest_path)
            .field("mode_variable", &self.mode_variable)
            .finish_non_exhaustive()
    }
}

/// Runs a derivation, logging its outcome
fn resolve<T>(section: &'static str, derive: impl FnOnce() -> Result<T>) -> Result<T> {
    match derive() {
        Ok(value) => {
            crate::log_section_resolved!(section);
            Ok(value)
        }
        Err(e) => {
            crate::log_section_failed!(section, e);
            Err(e)
        }
    }
}

/// Builder for [`ServiceConfig`]
#[derive(Default)]
pub struct ServiceConfigBuilder {
    source: Option<Box<dyn ConfigSource>>,
    base_dir: Option<PathBuf>,
    manifest_path: Option<PathBuf>,
    mode_variable: Option<String>,
    env_lookup: Option<EnvLookup>,
}

impl ServiceConfigBuilder {
    /// Key-value source; defaults to an empty `config::Config`
    pub fn source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Base directory; defaults to `.`
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Manifest location, relative paths resolve against the base directory;
    /// defaults to `Cargo.toml`
    pub fn manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    /// Name of the mode variable; defaults to `RUN_ENV`
    pub fn mode_variable(mut self, name: impl Into<String>) -> Self {
        self.mode_variable = Some(name.into());
        self
    }

    /// Process environment lookup; defaults to `std::env::var`
    pub fn env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env_lookup = Some(Arc::new(lookup));
        self
    }

    /// Fixes the raw mode string instead of reading the process environment
    pub fn environment(self, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        self.env_lookup(move |_| Some(raw.clone()))
    }

    pub fn build(self) -> ServiceConfig {
        let base_dir = self.base_dir.unwrap_or_else(|| PathBuf::from("."));
        let manifest_path = base_dir.join(
            self.manifest_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST)),
        );

        ServiceConfig {
            source: self
                .source
                .unwrap_or_else(|| Box::new(config::Config::default())),
            manifest_path,
            base_dir,
            mode_variable: self
                .mode_variable
                .unwrap_or_else(|| MODE_VARIABLE.to_string()),
            env_lookup: self
                .env_lookup
                .unwrap_or_else(|| Arc::new(|key: &str| std::env::var(key).ok())),
            environment: OnceCell::new(),
            package_info: OnceCell::new(),
            application: OnceCell::new(),
            database: OnceCell::new(),
            logger: OnceCell::new(),
            swagger: OnceCell::new(),
            kafka: OnceCell::new(),
            auth: tokio::sync::OnceCell::new(),
        }
    }
}
