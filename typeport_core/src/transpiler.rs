//! The build orchestrator.
//!
//! A run goes Validated → Scanned → Rendered → WorkspaceCreated →
//! FileWritten → Invoked → Succeeded/Failed. Nothing touches the filesystem
//! before the workspace is created, and the workspace guard removes it again
//! on every exit from [`Transpiler::transpile`].

use crate::config::{FacilityConfig, TypeportConfig};
use crate::error::{Result, TypeportError};
use crate::manifest::CrateDependency;
use crate::params::BuildParameters;
use crate::scanner::DeclarationScanner;
use crate::template::ProgramTemplate;
use crate::toolchain::{CommandToolchain, Toolchain, ToolchainOutput};
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Report of a successful run.
#[derive(Debug, Clone)]
pub struct TranspileReport {
    /// Number of structs registered with the facility.
    pub structs_found: usize,
    /// Absolute path the facility was asked to write.
    pub output_file: PathBuf,
    /// Workspace the program ran in. Already removed.
    pub workspace: PathBuf,
    /// What the generated program printed.
    pub toolchain_output: ToolchainOutput,
}

/// A rendered program that has not been written anywhere yet.
#[derive(Debug, Clone)]
pub struct RenderedProgram {
    pub source: String,
    pub structs_found: usize,
    pub output_file: PathBuf,
}

/// Drives scan, render, build-and-run and cleanup.
pub struct Transpiler<T: Toolchain = CommandToolchain> {
    working_dir: PathBuf,
    facility: FacilityConfig,
    toolchain: T,
}

impl Transpiler<CommandToolchain> {
    pub fn from_config(config: &TypeportConfig) -> Self {
        Self::new(
            config.working_dir(),
            config.facility.clone(),
            CommandToolchain::from_config(&config.toolchain),
        )
    }
}

impl<T: Toolchain> Transpiler<T> {
    pub fn new(working_dir: impl Into<PathBuf>, facility: FacilityConfig, toolchain: T) -> Self {
        Self {
            working_dir: working_dir.into(),
            facility,
            toolchain,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Validates, scans `package_dir` and renders the program text.
    pub fn render(&self, package_dir: &Path, params: &BuildParameters) -> Result<RenderedProgram> {
        params.validate().inspect_err(|err| error!("{}", err))?;
        debug!("Package `{}` validated", params.package_path.trim());

        let scan = DeclarationScanner::new(package_dir).scan()?;
        info!("Found {} structs in {}.", scan.len(), params.output_file.display());

        let package = CrateDependency::resolve(package_dir, &params.package_path)?;
        let output_file = std::path::absolute(&params.output_file)?;

        let template = ProgramTemplate::new(params, &package, &self.facility, &scan, &output_file);
        let source = template.render();
        debug!("Rendered {} bytes of program text", source.len());

        Ok(RenderedProgram {
            source,
            structs_found: template.structs().len(),
            output_file,
        })
    }

    /// Runs the whole pipeline for the structs under `package_dir`.
    ///
    /// On success the facility has written `params.output_file`. On any
    /// error no workspace is left behind; a failed build returns
    /// [`TypeportError::Build`] carrying the program's combined output.
    pub fn transpile(
        &self,
        package_dir: &Path,
        params: &BuildParameters,
    ) -> Result<TranspileReport> {
        let program = self.render(package_dir, params)?;

        let workspace = Workspace::create(&self.working_dir)?;
        info!("{}", workspace.path().display());

        let program_file = workspace.write_program(&program.source)?;

        let output = self
            .toolchain
            .build_and_run(workspace.path(), program_file.path())
            .inspect_err(|err| error!("{}", err))?;

        if !output.success {
            error!("{}", output.output);
            return Err(TypeportError::Build {
                status: output.status(),
                output: output.output,
            });
        }
        info!("{}", output.output);

        Ok(TranspileReport {
            structs_found: program.structs_found,
            output_file: program.output_file,
            workspace: workspace.path().to_path_buf(),
            toolchain_output: output,
        })
    }
}
