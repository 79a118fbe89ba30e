//! Integration tests for section resolution and memoization
//!
//! Every test builds its own `ServiceConfig` against a temporary directory and
//! injects the runtime mode, so no test touches the process environment.

use config::{Config, File, FileFormat};
use service_config::config::{load_source_from, Brokers, Environment, ServiceConfig};
use service_config::domain::ServiceConfigError;
use service_config::logging::{LogDestination, LoggerSection, PrettyPrint};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tempfile::TempDir;
use test_case::test_case;
use tracing::Level;

const MANIFEST: &str = r#"
[package]
name = "orders-api"
version = "2.3.0"
description = "Orders API"
"#;

fn service_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("Cargo.toml"), MANIFEST).unwrap();
    dir
}

fn source(toml: &str) -> Config {
    Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()
        .unwrap()
}

fn service_config(dir: &TempDir, environment: &str, toml: &str) -> ServiceConfig {
    ServiceConfig::builder()
        .base_dir(dir.path())
        .source(source(toml))
        .environment(environment)
        .build()
}

#[test]
fn test_application_from_manifest() {
    let dir = service_dir();
    let config = service_config(&dir, "test", "");

    let application = config.application().unwrap();
    assert_eq!(application.name, "orders-api");
    assert_eq!(application.version, "2.3.0");
    assert_eq!(application.description, "Orders API");
    assert_eq!(application.host, "0.0.0.0");
    assert_eq!(application.port, 8080);
    assert_eq!(application.pid.len(), 36);
}

#[test]
fn test_swagger_derived_from_application() {
    let dir = service_dir();
    let config = service_config(&dir, "test", "");

    let swagger = config.swagger().unwrap();
    assert_eq!(swagger.route_prefix, "/documentation");
    assert!(swagger.expose_route);
    assert_eq!(swagger.openapi.info.title, "orders-api API");
    assert_eq!(swagger.openapi.info.description, "Orders API");
    assert_eq!(swagger.openapi.info.version, "2.3.0");
    assert_eq!(swagger.openapi.consumes, vec!["application/json".to_string()]);
    assert!(swagger.openapi.host.is_none());
}

#[test]
fn test_swagger_overrides() {
    let dir = service_dir();
    let config = service_config(
        &dir,
        "development",
        r#"
[documentation]
route_prefix = "/docs"
expose_route = false
host = "api.example.com"
"#,
    );

    let swagger = config.swagger().unwrap();
    assert_eq!(swagger.route_prefix, "/docs");
    assert!(!swagger.expose_route);
    assert_eq!(swagger.openapi.host.as_deref(), Some("api.example.com"));
}

#[test]
fn test_sections_are_memoized() {
    let dir = service_dir();
    let config = service_config(&dir, "development", "");

    assert!(std::ptr::eq(config.environment(), config.environment()));
    assert!(std::ptr::eq(
        config.package_info().unwrap(),
        config.package_info().unwrap()
    ));
    assert!(std::ptr::eq(
        config.application().unwrap(),
        config.application().unwrap()
    ));
    assert!(std::ptr::eq(config.database().unwrap(), config.database().unwrap()));
    assert!(std::ptr::eq(config.logger().unwrap(), config.logger().unwrap()));
    assert!(std::ptr::eq(config.swagger().unwrap(), config.swagger().unwrap()));
    assert!(std::ptr::eq(config.kafka().unwrap(), config.kafka().unwrap()));
}

#[test]
fn test_pid_stable_for_instance() {
    let dir = service_dir();
    let config = service_config(&dir, "test", "");
    let pid = config.application().unwrap().pid.clone();

    assert_eq!(config.application().unwrap().pid, pid);

    let other = service_config(&dir, "test", "");
    assert_ne!(other.application().unwrap().pid, pid);
}

#[test]
fn test_cached_value_survives_manifest_change() {
    let dir = service_dir();
    let config = service_config(&dir, "test", "");
    assert_eq!(config.package_info().unwrap().version, "2.3.0");

    std::fs::write(
        dir.path().join("Cargo.toml"),
        "[package]\nname = \"renamed\"\nversion = \"9.9.9\"\n",
    )
    .unwrap();

    assert_eq!(config.package_info().unwrap().name, "orders-api");
    assert_eq!(config.application().unwrap().version, "2.3.0");
}

#[test]
fn test_failures_are_not_cached() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("Cargo.toml"), "[package]\nversion = \"1.0.0\"\n").unwrap();
    let config = service_config(&dir, "test", "");

    let err = config.application().unwrap_err();
    assert!(matches!(err, ServiceConfigError::MissingManifestName { .. }));
    assert!(matches!(
        config.application(),
        Err(ServiceConfigError::MissingManifestName { .. })
    ));

    std::fs::write(dir.path().join("Cargo.toml"), MANIFEST).unwrap();
    assert_eq!(config.application().unwrap().name, "orders-api");
}

#[test]
fn test_json_manifest() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("package.json"),
        r#"{"name": "orders-api", "version": "2.3.0", "description": "Orders API"}"#,
    )
    .unwrap();
    let config = ServiceConfig::builder()
        .base_dir(dir.path())
        .manifest_path("package.json")
        .environment("test")
        .build();

    assert_eq!(config.package_info().unwrap().name, "orders-api");
}

#[test_case("test" ; "test")]
#[test_case("development" ; "development")]
fn test_database_local_defaults(environment: &str) {
    let dir = service_dir();
    let config = service_config(&dir, environment, "");

    let database = config.database().unwrap();
    assert_eq!(database.database, "orders-api");
    assert_eq!(database.host, "postgres_container");
    assert_eq!(database.port, 5432);
    assert_eq!(database.user, "postgres");
    assert_eq!(database.password.expose_secret(), "postgres");
    assert!(database.migrations_directory.is_none());
}

#[test_case("", "database.host" ; "nothing configured")]
#[test_case("[database]\nhost = \"db\"\n", "database.user" ; "user missing")]
#[test_case("[database]\nhost = \"db\"\nuser = \"orders\"\n", "database.password" ; "password missing")]
fn test_database_production_requires_credentials(toml: &str, missing: &str) {
    let dir = service_dir();
    let config = service_config(&dir, "production", toml);

    match config.database().unwrap_err() {
        ServiceConfigError::MissingRequiredKey { key } => assert_eq!(key, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_database_production_configured() {
    let dir = service_dir();
    let config = service_config(
        &dir,
        "production",
        r#"
[database]
host = "db.internal"
user = "orders"
password = "s3cret"
migrations_directory = "migrations"
"#,
    );

    let database = config.database().unwrap();
    assert_eq!(database.host, "db.internal");
    assert_eq!(database.port, 5432);
    assert_eq!(database.database, "orders-api");
    assert_eq!(database.password.expose_secret(), "s3cret");
    assert_eq!(database.migrations_directory.as_deref(), Some("migrations"));
    assert!(!format!("{database:?}").contains("s3cret"));
}

#[test]
fn test_logger_disabled_in_test() {
    let dir = service_dir();
    let config = service_config(&dir, "test", "");

    assert!(matches!(config.logger().unwrap(), LoggerSection::Disabled));
    assert!(!dir.path().join(".logs").exists());
}

#[test]
fn test_logger_console_in_development() {
    let dir = service_dir();
    let config = service_config(&dir, "development", "");

    let sink = config.logger().unwrap().sink().unwrap();
    assert!(matches!(sink.destination, LogDestination::Console));
    assert!(matches!(sink.pretty_print, PrettyPrint::Enabled(_)));
    assert_eq!(sink.level, Level::DEBUG);
}

#[test]
fn test_logger_file_in_production() {
    let dir = service_dir();
    let config = service_config(&dir, "production", "");

    let sink = config.logger().unwrap().sink().unwrap();
    match &sink.destination {
        LogDestination::File(file) => assert_eq!(file.path(), dir.path().join(".logs")),
        LogDestination::Console => panic!("expected file destination"),
    }
    assert_eq!(sink.pretty_print, PrettyPrint::Disabled);
    assert_eq!(sink.level, Level::INFO);
    assert!(dir.path().join(".logs").exists());
}

#[test]
fn test_logger_production_overrides() {
    let dir = service_dir();
    let config = service_config(
        &dir,
        "production",
        r#"
[logger]
destination = "logs/orders.log"
pretty_print = true
level = "warn"
"#,
    );

    let sink = config.logger().unwrap().sink().unwrap();
    assert!(matches!(sink.pretty_print, PrettyPrint::Enabled(_)));
    assert_eq!(sink.level, Level::WARN);
    assert!(dir.path().join("logs/orders.log").exists());
}

#[test_case("production" ; "production")]
#[test_case("development" ; "development")]
#[test_case("test" ; "test")]
fn test_kafka_client_id_is_application_name(environment: &str) {
    let dir = service_dir();
    let config = service_config(&dir, environment, "");

    let kafka = config.kafka().unwrap();
    assert_eq!(kafka.client_id, config.application().unwrap().name);
}

#[test]
fn test_kafka_broker_defaults() {
    let dir = service_dir();

    let development = service_config(&dir, "development", "");
    assert_eq!(
        development.kafka().unwrap().brokers,
        Brokers::List(vec!["localhost:9092".to_string()])
    );

    let test = service_config(&dir, "test", "");
    assert_eq!(test.kafka().unwrap().brokers, Brokers::Empty);

    let production = service_config(&dir, "production", "");
    assert_eq!(production.kafka().unwrap().brokers, Brokers::Unset);
}

#[test]
fn test_kafka_configured_brokers() {
    let dir = service_dir();
    let config = service_config(
        &dir,
        "production",
        "[kafka]\nbrokers = [\"kafka-1:9092\", \"kafka-2:9092\"]\n",
    );

    let kafka = config.kafka().unwrap();
    assert_eq!(kafka.brokers.addresses().map(<[String]>::len), Some(2));

    let application = config.application().unwrap();
    assert_eq!(
        kafka.group_id,
        format!("{}_{}", application.name, application.pid)
    );
}

#[test]
fn test_concurrent_first_access_resolves_once() {
    let dir = service_dir();
    let config = Arc::new(service_config(&dir, "test", ""));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let config = Arc::clone(&config);
            std::thread::spawn(move || config.application().unwrap().pid.clone())
        })
        .collect();

    let pids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(pids.iter().all(|pid| *pid == pids[0]));
}

fn env_vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn test_env_values_keep_their_text() {
    let dir = service_dir();
    let vars = env_vars(&[
        ("SERVICE_VERSION", "2.10"),
        ("SERVICE_PORT", "9090"),
        ("SERVICE_DATABASE__HOST", "db.internal"),
        ("SERVICE_DATABASE__USER", "orders"),
        ("SERVICE_DATABASE__PASSWORD", "007"),
        ("SERVICE_DATABASE__PORT", "6432"),
    ]);
    let config = ServiceConfig::builder()
        .base_dir(dir.path())
        .source(load_source_from(dir.path(), Environment::Production, vars).unwrap())
        .environment("production")
        .build();

    let application = config.application().unwrap();
    assert_eq!(application.version, "2.10");
    assert_eq!(application.port, 9090);

    let database = config.database().unwrap();
    assert_eq!(database.host, "db.internal");
    assert_eq!(database.port, 6432);
    assert_eq!(database.password.expose_secret(), "007");
}

#[test]
fn test_env_lists_split_on_comma() {
    let dir = service_dir();
    let vars = env_vars(&[
        ("SERVICE_KAFKA__BROKERS", "kafka-1:9092,kafka-2:9092"),
        ("SERVICE_CONSUMES", "application/json, text/plain"),
        ("SERVICE_DOCUMENTATION__EXPOSE_ROUTE", "false"),
    ]);
    let config = ServiceConfig::builder()
        .base_dir(dir.path())
        .source(load_source_from(dir.path(), Environment::Test, vars).unwrap())
        .environment("test")
        .build();

    assert_eq!(
        config.kafka().unwrap().brokers,
        Brokers::List(vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()])
    );
    assert_eq!(
        config.application().unwrap().consumes,
        vec!["application/json".to_string(), "text/plain".to_string()]
    );
    assert!(!config.swagger().unwrap().expose_route);
}

#[test]
fn test_null_optional_keys_are_absent() {
    let dir = service_dir();
    let source = Config::builder()
        .add_source(File::from_str(
            r#"{"documentation": {"host": null}, "database": {"migrations_directory": null}}"#,
            FileFormat::Json,
        ))
        .build()
        .unwrap();
    let config = ServiceConfig::builder()
        .base_dir(dir.path())
        .source(source)
        .environment("test")
        .build();

    assert!(config.swagger().unwrap().openapi.host.is_none());
    assert!(config.database().unwrap().migrations_directory.is_none());
}

#[test]
fn test_env_pretty_print_flag() {
    let dir = service_dir();
    let vars = env_vars(&[
        ("SERVICE_LOGGER__PRETTY_PRINT", "false"),
        ("SERVICE_LOGGER__LEVEL", "warn"),
    ]);
    let config = ServiceConfig::builder()
        .base_dir(dir.path())
        .source(load_source_from(dir.path(), Environment::Development, vars).unwrap())
        .environment("development")
        .build();

    let sink = config.logger().unwrap().sink().unwrap();
    assert_eq!(sink.pretty_print, PrettyPrint::Disabled);
    assert_eq!(sink.level, Level::WARN);
}
