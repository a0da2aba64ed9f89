//! Command handlers for the Typeport CLI.

pub mod render;
pub mod scan;
pub mod transpile;

use crate::cli::{Cli, PackageArgs};
use typeport_core::{BuildParameters, Result, TypeportConfig};

/// Loads the configuration named on the command line, or the nearest one.
pub fn load_config(cli: &Cli) -> Result<TypeportConfig> {
    TypeportConfig::load(cli.config.as_deref())
}

/// Parameters from the config file with command-line overrides applied.
///
/// Imports from the command line come after the configured ones.
pub fn build_parameters(config: &TypeportConfig, args: &PackageArgs) -> BuildParameters {
    let mut params = config.build_parameters(args.package_path.as_str(), args.output.as_path());
    params.custom_imports.extend(args.imports.iter().cloned());
    params.init_params.extend(args.init_params.iter().cloned());
    if args.concrete {
        params.create_interface = false;
    }
    params
}
