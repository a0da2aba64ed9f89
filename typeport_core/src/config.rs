use crate::error::{Result, TypeportError};
use crate::params::{BuildParameters, default_init_params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, trace, warn};

/// Name of the configuration file searched for in the current directory and
/// its ancestors.
pub const CONFIG_FILE_NAME: &str = "typeport.toml";

/// General configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory that holds the temporary workspaces. Defaults to the system
    /// temp directory.
    pub working_dir: Option<String>,
}

/// Defaults for the generated program
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranspileConfig {
    /// Generate TypeScript interfaces instead of classes
    pub create_interface: bool,
    /// Import lines added to the generated TypeScript file
    pub custom_imports: Vec<String>,
    /// Facility fields set before conversion, as Rust expressions
    pub init_params: BTreeMap<String, String>,
}

impl Default for TranspileConfig {
    fn default() -> Self {
        Self {
            create_interface: true,
            custom_imports: Vec::new(),
            init_params: default_init_params(),
        }
    }
}

/// The conversion library the generated program links against
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FacilityConfig {
    /// Path of the converter type, e.g. `typescriptify::TypeScriptify`
    pub type_path: String,
    /// Dependency key in the generated manifest
    pub crate_name: String,
    /// Dependency value in the generated manifest: a version string or an
    /// inline table such as `{ git = "..." }`
    pub dependency: toml::Value,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            type_path: "typescriptify::TypeScriptify".to_string(),
            crate_name: "typescriptify".to_string(),
            dependency: toml::Value::String("0.1".to_string()),
        }
    }
}

impl FacilityConfig {
    /// Last segment of `type_path`, used to call the constructor after the
    /// `use` line.
    pub fn type_name(&self) -> &str {
        self.type_path
            .rsplit("::")
            .next()
            .unwrap_or(self.type_path.as_str())
    }
}

/// Command that builds and runs the generated program. The program's file
/// name is appended after `args`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolchainConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: ["+nightly", "-Zscript", "run", "--quiet", "--manifest-path"]
                .iter()
                .map(|arg| arg.to_string())
                .collect(),
        }
    }
}

/// Root configuration, read from `typeport.toml`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TypeportConfig {
    pub general: GeneralConfig,
    pub transpile: TranspileConfig,
    pub facility: FacilityConfig,
    pub toolchain: ToolchainConfig,
}

impl TypeportConfig {
    /// Loads the configuration from `path`, or from the nearest
    /// `typeport.toml` when no path is given. Without a file the defaults are
    /// used.
    pub fn load(path: Option<&Path>) -> Result<TypeportConfig> {
        match path {
            Some(path) => Self::from_path(path),
            None => match Self::find_config_file()? {
                Some(path) => Self::from_path(&path),
                None => {
                    debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Ok(Self::default())
                }
            },
        }
    }

    /// Loads the configuration from a specific file.
    pub fn from_path(path: &Path) -> Result<TypeportConfig> {
        info!("Loading Typeport configuration from {:?}", path);
        let contents = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read configuration file: {}", e);
            TypeportError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;

        debug!("Configuration file size: {} bytes", contents.len());
        Self::parse(&contents)
    }

    /// Parses TOML content and substitutes environment variables.
    pub fn parse(contents: &str) -> Result<TypeportConfig> {
        let mut config: TypeportConfig = toml::from_str(contents).map_err(|e| {
            error!("Failed to parse TOML configuration: {}", e);
            TypeportError::config(e.to_string())
        })?;

        if let Some(working_dir) = config.general.working_dir.take() {
            config.general.working_dir = Some(Self::substitute_env_vars(&working_dir)?);
        }
        for import in &mut config.transpile.custom_imports {
            *import = Self::substitute_env_vars(import)?;
        }
        for value in config.transpile.init_params.values_mut() {
            *value = Self::substitute_env_vars(value)?;
        }
        config.facility.type_path = Self::substitute_env_vars(&config.facility.type_path)?;
        config.facility.crate_name = Self::substitute_env_vars(&config.facility.crate_name)?;
        Self::substitute_in_value(&mut config.facility.dependency)?;
        config.toolchain.program = Self::substitute_env_vars(&config.toolchain.program)?;
        for arg in &mut config.toolchain.args {
            *arg = Self::substitute_env_vars(arg)?;
        }

        debug!(
            "Facility: {}, toolchain: {} {:?}",
            config.facility.type_path, config.toolchain.program, config.toolchain.args
        );
        Ok(config)
    }

    /// Directory the temporary workspaces are created in.
    pub fn working_dir(&self) -> PathBuf {
        self.general
            .working_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir)
    }

    /// Parameters for one run, seeded from the `[transpile]` section.
    pub fn build_parameters(
        &self,
        package_path: impl Into<String>,
        output_file: impl Into<PathBuf>,
    ) -> BuildParameters {
        BuildParameters::builder(package_path, output_file)
            .custom_imports(self.transpile.custom_imports.clone())
            .init_params(self.transpile.init_params.clone())
            .create_interface(self.transpile.create_interface)
            .build()
    }

    /// Searches for `typeport.toml` from the current directory up to the root.
    fn find_config_file() -> Result<Option<PathBuf>> {
        let current_dir = env::current_dir()?;
        debug!("Starting config file search from: {:?}", current_dir);

        for path in current_dir.ancestors() {
            let config_path = path.join(CONFIG_FILE_NAME);
            trace!("Checking for config at: {:?}", config_path);
            if config_path.exists() {
                return Ok(Some(config_path));
            }
        }

        Ok(None)
    }

    /// Substitutes every string inside a TOML value, tables and arrays included.
    fn substitute_in_value(value: &mut toml::Value) -> Result<()> {
        match value {
            toml::Value::String(text) => *text = Self::substitute_env_vars(text)?,
            toml::Value::Array(items) => {
                for item in items {
                    Self::substitute_in_value(item)?;
                }
            }
            toml::Value::Table(table) => {
                for (_, item) in table.iter_mut() {
                    Self::substitute_in_value(item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Substitute environment variables in config strings
    /// Supports ${VAR_NAME:-default} syntax
    fn substitute_env_vars(value: &str) -> Result<String> {
        trace!("Substituting environment variables in: {}", value);
        let mut result = value.to_string();

        let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")?;

        for cap in re.captures_iter(value) {
            let var_name = &cap[1];
            let default_value = cap.get(2).map(|m| m.as_str());

            let replacement = match env::var(var_name) {
                Ok(val) => val,
                Err(_) => match default_value {
                    Some(default) => {
                        warn!(
                            "Environment variable {} not set, using default: {}",
                            var_name, default
                        );
                        default.to_string()
                    }
                    None => {
                        error!(
                            "Environment variable {} not set and no default provided",
                            var_name
                        );
                        return Err(TypeportError::EnvVarNotSet(var_name.to_string()));
                    }
                },
            };

            result = result.replace(&cap[0], &replacement);
        }

        Ok(result)
    }
}
