//! Locating the crate that owns the scanned package.
//!
//! The generated program is a standalone Cargo script, so it needs a path
//! dependency on the crate whose structs it registers.

use crate::error::{Result, TypeportError};
use crate::params::parse_package_path;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A path dependency on the scanned crate, keyed by the first segment of the
/// package path so that `use <package_path> as m;` resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrateDependency {
    /// Dependency key, the crate name as written in Rust paths.
    pub alias: String,
    /// `[package].name` from the crate's manifest.
    pub package_name: String,
    /// Directory containing the crate's `Cargo.toml`.
    pub manifest_dir: PathBuf,
}

impl CrateDependency {
    /// Finds the nearest `Cargo.toml` at or above `package_dir` and reads the
    /// package name from it.
    pub fn resolve(package_dir: &Path, package_path: &str) -> Result<Self> {
        let alias = crate_alias(package_path)?;

        let start = fs::canonicalize(package_dir)
            .map_err(|err| TypeportError::discovery(package_dir, err.to_string()))?;

        let manifest_path = start
            .ancestors()
            .map(|dir| dir.join("Cargo.toml"))
            .inspect(|candidate| trace!("Checking for manifest at: {:?}", candidate))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                TypeportError::config(format!(
                    "No Cargo.toml found at or above {}",
                    start.display()
                ))
            })?;

        let package_name = read_package_name(&manifest_path)?;
        let manifest_dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(start);

        debug!(
            "Package `{}` resolved to crate `{}` at {:?}",
            package_path, package_name, manifest_dir
        );

        Ok(Self {
            alias,
            package_name,
            manifest_dir,
        })
    }

    /// The `[dependencies]` line for the generated manifest.
    pub fn render(&self) -> String {
        format!(
            "{} = {{ package = {}, path = {} }}",
            self.alias,
            toml_string(&self.package_name),
            toml_string(&self.manifest_dir.to_string_lossy())
        )
    }
}

fn crate_alias(package_path: &str) -> Result<String> {
    parse_package_path(package_path)?
        .segments
        .first()
        .map(|segment| segment.ident.to_string())
        .ok_or_else(|| TypeportError::config(format!("Invalid package `{}`", package_path)))
}

fn read_package_name(manifest_path: &Path) -> Result<String> {
    let content = fs::read_to_string(manifest_path)?;
    let manifest: toml::Table = toml::from_str(&content).map_err(|err| {
        TypeportError::config(format!("Cannot parse {}: {}", manifest_path.display(), err))
    })?;

    manifest
        .get("package")
        .and_then(|package| package.get("name"))
        .and_then(|name| name.as_str())
        .map(String::from)
        .ok_or_else(|| {
            TypeportError::config(format!(
                "{} has no [package] name",
                manifest_path.display()
            ))
        })
}

pub(crate) fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn crate_fixture(name: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("Cargo.toml"),
            format!("[package]\nname = \"{name}\"\nversion = \"0.1.0\"\n"),
        )
        .unwrap();
        fs::create_dir_all(temp_dir.path().join("src/models")).unwrap();
        temp_dir
    }

    #[test]
    fn test_resolve_from_nested_directory() {
        let temp_dir = crate_fixture("shop-models");
        let package_dir = temp_dir.path().join("src/models");

        let dependency = CrateDependency::resolve(&package_dir, "shop_models::models").unwrap();

        assert_eq!(dependency.alias, "shop_models");
        assert_eq!(dependency.package_name, "shop-models");
        assert_eq!(
            dependency.manifest_dir,
            fs::canonicalize(temp_dir.path()).unwrap()
        );
    }

    #[test]
    fn test_render_dependency_line() {
        let dependency = CrateDependency {
            alias: "shop_models".to_string(),
            package_name: "shop-models".to_string(),
            manifest_dir: PathBuf::from("/work/shop"),
        };

        assert_eq!(
            dependency.render(),
            r#"shop_models = { package = "shop-models", path = "/work/shop" }"#
        );
    }

    #[test]
    fn test_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        // Ancestors of a temp dir normally carry no Cargo.toml; skip if they do.
        if temp_dir
            .path()
            .ancestors()
            .any(|dir| dir.join("Cargo.toml").is_file())
        {
            return;
        }

        let err = CrateDependency::resolve(temp_dir.path(), "models").unwrap_err();
        assert!(matches!(err, TypeportError::Config(_)));
    }

    #[test]
    fn test_manifest_without_package() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("Cargo.toml"),
            "[workspace]\nmembers = []\n",
        )
        .unwrap();

        let err = CrateDependency::resolve(temp_dir.path(), "models").unwrap_err();
        assert!(err.to_string().contains("has no [package] name"));
    }

    #[test]
    fn test_missing_package_dir() {
        let temp_dir = crate_fixture("models");
        let err =
            CrateDependency::resolve(&temp_dir.path().join("absent"), "models").unwrap_err();
        assert!(matches!(err, TypeportError::Discovery { .. }));
    }

    #[test]
    fn test_relative_package_path_is_rejected() {
        let temp_dir = crate_fixture("shop-models");
        let err = CrateDependency::resolve(temp_dir.path(), "crate::models").unwrap_err();
        assert!(matches!(err, TypeportError::Config(_)));
    }
}
