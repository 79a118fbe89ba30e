//! Package manifest reading
//!
//! The service identity (name, version, description) comes from its own
//! package manifest. TOML manifests are read from their `[package]` table
//! (Cargo layout) or from the root table; `.json` manifests from the root
//! object. Values that are not plain strings, such as
//! `version.workspace = true`, count as absent.

use crate::config::schema::PackageInfoSection;
use crate::domain::errors::ServiceConfigError;
use crate::domain::result::Result;
use std::fs;
use std::path::Path;

/// Default manifest file name, relative to the base directory
pub const DEFAULT_MANIFEST: &str = "Cargo.toml";

/// Version used when the manifest has none
pub const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Debug, Default)]
struct ManifestFields {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
}

/// Reads the manifest at `path` into a [`PackageInfoSection`].
///
/// # Errors
///
/// - [`ServiceConfigError::Manifest`] if the file cannot be read or parsed
/// - [`ServiceConfigError::MissingManifestName`] if it has no name
pub fn read_manifest(path: &Path) -> Result<PackageInfoSection> {
    let contents = fs::read_to_string(path).map_err(|e| ServiceConfigError::Manifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let fields = if is_json {
        parse_json(&contents)
    } else {
        parse_toml(&contents)
    }
    .map_err(|reason| ServiceConfigError::Manifest {
        path: path.to_path_buf(),
        reason,
    })?;

    let name = fields
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ServiceConfigError::MissingManifestName {
            path: path.to_path_buf(),
        })?;

    Ok(PackageInfoSection {
        version: fields.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        description: fields
            .description
            .unwrap_or_else(|| format!("{name} service")),
        name,
    })
}

fn parse_toml(contents: &str) -> std::result::Result<ManifestFields, String> {
    let root: toml::Table = toml::from_str(contents).map_err(|e| e.to_string())?;
    let table = match root.get("package") {
        Some(toml::Value::Table(package)) => package,
        _ => &root,
    };
    let field = |key: &str| table.get(key).and_then(|v| v.as_str()).map(str::to_string);

    Ok(ManifestFields {
        name: field("name"),
        version: field("version"),
        description: field("description"),
    })
}

fn parse_json(contents: &str) -> std::result::Result<ManifestFields, String> {
    let root: serde_json::Value = serde_json::from_str(contents).map_err(|e| e.to_string())?;
    let field = |key: &str| {
        root.get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    };

    Ok(ManifestFields {
        name: field("name"),
        version: field("version"),
        description: field("description"),
    })
}
