//! Layered configuration source
//!
//! Section derivations see configuration through the [`ConfigSource`] trait:
//! a dot-path lookup with an existence check. The default source is a
//! `config::Config` built by [`load_source`] from optional files under
//! `config/` plus `SERVICE_*` environment variables.

use crate::config::profile::Environment;
use crate::domain::errors::ServiceConfigError;
use crate::domain::result::Result;
use config::{Config, File, Map, Value, ValueKind};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// Prefix for environment variable overrides (`SERVICE_DATABASE__HOST`)
pub const ENV_PREFIX: &str = "SERVICE";

/// Separator between nested key segments in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Separator for list values given as a single string
pub const LIST_SEPARATOR: char = ',';

/// Hierarchical key-value lookup addressed by dot-separated paths
pub trait ConfigSource: Send + Sync {
    /// Returns the raw value stored at `key`, if any
    fn lookup(&self, key: &str) -> Option<Value>;

    /// Whether a value exists at `key`
    fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }
}

impl ConfigSource for Config {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get::<Value>(key)
            .ok()
            .filter(|value| !matches!(value.kind, ValueKind::Nil))
    }
}

/// Reads `key` from `source` and converts it to `T`.
///
/// Returns `Ok(None)` when the key is absent and an
/// [`ServiceConfigError::InvalidValue`] when the stored value has the wrong
/// shape.
pub fn read<T: DeserializeOwned>(source: &dyn ConfigSource, key: &str) -> Result<Option<T>> {
    match source.lookup(key) {
        Some(value) => value
            .try_deserialize::<T>()
            .map(Some)
            .map_err(|e| ServiceConfigError::InvalidValue {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// List stored either as an array or as one comma-separated string
#[derive(Deserialize)]
#[serde(untagged)]
enum ListSetting {
    Items(Vec<String>),
    Joined(String),
}

/// Reads a list of strings at `key`.
///
/// Environment variables can only carry strings, so `a,b` is accepted as
/// well as a real array. Items are trimmed and empty items dropped.
pub fn read_list(source: &dyn ConfigSource, key: &str) -> Result<Option<Vec<String>>> {
    Ok(read::<ListSetting>(source, key)?.map(|setting| match setting {
        ListSetting::Items(items) => items,
        ListSetting::Joined(joined) => joined
            .split(LIST_SEPARATOR)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    }))
}

/// Reads `key`, falling back to `default`, failing when neither exists.
///
/// A `None` default marks the value as required.
pub fn require<T: DeserializeOwned>(
    source: &dyn ConfigSource,
    key: &str,
    default: Option<T>,
) -> Result<T> {
    read(source, key)?
        .or(default)
        .ok_or_else(|| ServiceConfigError::missing(key))
}

/// Reads `key`, computing the default only when the key is absent.
///
/// Used for defaults that depend on other sections, so those sections are
/// not resolved needlessly.
pub fn require_or_else<T, F>(source: &dyn ConfigSource, key: &str, default: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> Result<T>,
{
    match read(source, key)? {
        Some(value) => Ok(value),
        None => default(),
    }
}

/// Builds the default layered source.
///
/// Layers, later ones winning:
/// 1. `config/default.*`
/// 2. `config/<environment>.*`
/// 3. `config/local.*`
/// 4. `SERVICE_*` environment variables, `__` between nested segments
///
/// Environment values are kept as strings; [`read`] converts them to the
/// type a section asks for, so `SERVICE_DATABASE__PASSWORD=007` stays `007`.
/// All file layers are optional and may use any format the `config` crate
/// understands (toml, yaml, json, ...).
///
/// # Errors
///
/// Returns [`ServiceConfigError::Configuration`] when a file exists but cannot
/// be parsed.
pub fn load_source(base_dir: impl AsRef<Path>, environment: Environment) -> Result<Config> {
    build_source(base_dir.as_ref(), environment, None)
}

/// Like [`load_source`], but reads the `SERVICE_*` layer from `vars` instead
/// of the process environment.
pub fn load_source_from(
    base_dir: impl AsRef<Path>,
    environment: Environment,
    vars: Map<String, String>,
) -> Result<Config> {
    build_source(base_dir.as_ref(), environment, Some(vars))
}

fn build_source(
    base_dir: &Path,
    environment: Environment,
    vars: Option<Map<String, String>>,
) -> Result<Config> {
    let dir = base_dir.join("config");

    let env_source = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_SEPARATOR)
        .source(vars);

    let config = Config::builder()
        .add_source(File::from(dir.join("default")).required(false))
        .add_source(File::from(dir.join(environment.label())).required(false))
        .add_source(File::from(dir.join("local")).required(false))
        .add_source(env_source)
        .build()?;

    tracing::debug!(
        config_dir = %dir.display(),
        environment = %environment,
        "Configuration source loaded"
    );

    Ok(config)
}
