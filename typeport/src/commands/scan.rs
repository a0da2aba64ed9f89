//! Scan command - lists the struct names found under a directory.

use crate::cli::{Cli, ScanArgs};
use tracing::info;
use typeport_core::{DeclarationScanner, Result};

/// Runs the scan command.
///
/// Prints one `name<TAB>file` line per declaration, files relative to the
/// scanned directory.
pub fn run(_cli: &Cli, args: ScanArgs) -> Result<()> {
    let scan = DeclarationScanner::new(&args.dir).scan()?;

    for declaration in &scan {
        let source = declaration
            .source
            .strip_prefix(&args.dir)
            .unwrap_or(&declaration.source);
        println!("{}\t{}", declaration.name, source.display());
    }

    info!("Found {} structs in {}.", scan.len(), args.dir.display());
    Ok(())
}
