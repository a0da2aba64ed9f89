//! Per-invocation parameters for the generated program.

use crate::error::{Result, TypeportError};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Initialization option applied when none are configured: keep the
/// facility's backups next to the generated program.
pub const DEFAULT_BACKUP_DIR_PARAM: (&str, &str) = ("backup_dir", "String::from(\".\")");

/// Parameters for one transpile run.
///
/// Built per invocation, consumed by the template renderer and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParameters {
    /// Rust path of the module holding the structs, e.g. `shop_models::domain`.
    /// It is imported into the generated program under a fixed alias.
    pub package_path: String,

    /// File the conversion facility writes the interfaces to.
    pub output_file: PathBuf,

    /// Import lines forwarded to the facility, in order. Not deduplicated.
    pub custom_imports: Vec<String>,

    /// Facility field name to Rust expression, assigned before any struct is
    /// registered.
    pub init_params: BTreeMap<String, String>,

    /// Generate `interface` declarations rather than concrete classes.
    pub create_interface: bool,
}

impl BuildParameters {
    pub fn new(package_path: impl Into<String>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            package_path: package_path.into(),
            output_file: output_file.into(),
            custom_imports: Vec::new(),
            init_params: default_init_params(),
            create_interface: true,
        }
    }

    /// Creates a builder for programmatic configuration.
    pub fn builder(
        package_path: impl Into<String>,
        output_file: impl Into<PathBuf>,
    ) -> BuildParametersBuilder {
        BuildParametersBuilder::new(package_path, output_file)
    }

    /// Checks the package identifier before anything touches the filesystem.
    pub fn validate(&self) -> Result<()> {
        let package_path = self.package_path.trim();
        if package_path.is_empty() {
            return Err(TypeportError::config("No package given"));
        }

        parse_package_path(package_path)?;
        Ok(())
    }
}

/// Path roots that name the current crate or module. In the generated program
/// they would point at the program itself rather than the scanned crate.
const RELATIVE_PATH_ROOTS: [&str; 4] = ["crate", "self", "super", "Self"];

/// Parses a package identifier that must start with an external crate name.
pub(crate) fn parse_package_path(package_path: &str) -> Result<syn::Path> {
    let package_path = package_path.trim();
    let path = syn::parse_str::<syn::Path>(package_path).map_err(|err| {
        TypeportError::config(format!(
            "Package `{}` is not a valid Rust path: {}",
            package_path, err
        ))
    })?;

    let root = path
        .segments
        .first()
        .map(|segment| segment.ident.to_string())
        .unwrap_or_default();
    if RELATIVE_PATH_ROOTS.contains(&root.as_str()) {
        return Err(TypeportError::config(format!(
            "Package `{}` must start with a crate name, not `{}`",
            package_path, root
        )));
    }

    Ok(path)
}

pub(crate) fn default_init_params() -> BTreeMap<String, String> {
    let (name, value) = DEFAULT_BACKUP_DIR_PARAM;
    BTreeMap::from([(name.to_string(), value.to_string())])
}

/// Builder for [`BuildParameters`].
#[derive(Debug, Clone)]
pub struct BuildParametersBuilder {
    params: BuildParameters,
}

impl BuildParametersBuilder {
    pub fn new(package_path: impl Into<String>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            params: BuildParameters::new(package_path, output_file),
        }
    }

    /// Appends an import line.
    pub fn custom_import(mut self, import: impl Into<String>) -> Self {
        self.params.custom_imports.push(import.into());
        self
    }

    /// Replaces all import lines.
    pub fn custom_imports(mut self, imports: Vec<String>) -> Self {
        self.params.custom_imports = imports;
        self
    }

    /// Sets one initialization option, replacing a previous value for the name.
    pub fn init_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.init_params.insert(name.into(), value.into());
        self
    }

    /// Replaces all initialization options, defaults included.
    pub fn init_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params.init_params = params;
        self
    }

    pub fn create_interface(mut self, create_interface: bool) -> Self {
        self.params.create_interface = create_interface;
        self
    }

    pub fn build(self) -> BuildParameters {
        self.params
    }
}
