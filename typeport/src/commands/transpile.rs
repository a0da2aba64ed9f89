//! Transpile command - runs the whole pipeline.

use super::{build_parameters, load_config};
use crate::cli::{Cli, TranspileArgs};
use tracing::{debug, info};
use typeport_core::{Result, Transpiler};

/// Runs the transpile command.
pub fn run(cli: &Cli, args: TranspileArgs) -> Result<()> {
    let mut config = load_config(cli)?;
    if let Some(working_dir) = &args.working_dir {
        debug!("Working directory overridden: {:?}", working_dir);
        config.general.working_dir = Some(working_dir.to_string_lossy().into_owned());
    }
    let params = build_parameters(&config, &args.package);

    let report = Transpiler::from_config(&config).transpile(&args.package.package_dir, &params)?;

    info!(
        "Wrote interfaces for {} structs to {}",
        report.structs_found,
        report.output_file.display()
    );
    Ok(())
}
