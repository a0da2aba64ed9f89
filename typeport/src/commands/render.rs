//! Render command - prints the generated program without running it.

use super::{build_parameters, load_config};
use crate::cli::{Cli, RenderArgs};
use tracing::debug;
use typeport_core::{Result, Transpiler};

/// Runs the render command. No workspace is created.
pub fn run(cli: &Cli, args: RenderArgs) -> Result<()> {
    let config = load_config(cli)?;
    let params = build_parameters(&config, &args.package);

    let program = Transpiler::from_config(&config).render(&args.package.package_dir, &params)?;
    debug!(
        "Rendered program registers {} structs for {}",
        program.structs_found,
        program.output_file.display()
    );

    print!("{}", program.source);
    Ok(())
}
