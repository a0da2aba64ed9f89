// Typeport - TypeScript interfaces for the structs of a Rust crate

pub mod config;
pub mod error;
pub mod manifest;
pub mod params;
pub mod scanner;
pub mod template;
pub mod toolchain;
pub mod transpiler;
pub mod workspace;

// Re-export commonly used items for convenience
pub use config::TypeportConfig;
pub use error::{Result, TypeportError};
pub use params::BuildParameters;
pub use scanner::{DeclarationName, DeclarationScanner, ScanResult};
pub use toolchain::{CommandToolchain, Toolchain, ToolchainOutput};
pub use transpiler::{TranspileReport, Transpiler};

use std::path::Path;

/// Generates interfaces for every struct under `package_dir` into
/// `output_file`, using the default configuration.
///
/// `package_path` is the Rust path of the scanned module, e.g.
/// `shop_models::domain`. Workspaces are created under `working_dir`.
pub fn transpile_directory(
    working_dir: &Path,
    package_dir: &Path,
    package_path: &str,
    output_file: &Path,
) -> Result<TranspileReport> {
    let config = TypeportConfig::default();
    let params = config.build_parameters(package_path, output_file);

    Transpiler::new(
        working_dir,
        config.facility.clone(),
        CommandToolchain::from_config(&config.toolchain),
    )
    .transpile(package_dir, &params)
}
