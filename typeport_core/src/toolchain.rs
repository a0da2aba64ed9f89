//! Building and running the generated program.

use crate::config::ToolchainConfig;
use crate::error::{Result, TypeportError};
use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Captured result of one build-and-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainOutput {
    pub success: bool,
    /// Exit code, absent when the process was killed by a signal.
    pub code: Option<i32>,
    /// Standard output and standard error, interleaved as written.
    pub output: String,
}

impl ToolchainOutput {
    pub fn status(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Something that can build and run a single generated source file.
///
/// The real implementation spawns a process; tests substitute their own.
#[cfg_attr(test, mockall::automock)]
pub trait Toolchain {
    /// Builds and runs `source` with `workspace` as the working directory,
    /// blocking until it finishes.
    fn build_and_run(&self, workspace: &Path, source: &Path) -> Result<ToolchainOutput>;
}

/// Spawns `program args... <file name>` in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandToolchain {
    program: String,
    args: Vec<String>,
}

impl CommandToolchain {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    /// The command line as it is run, for logs.
    pub fn command_line(&self, source: &Path) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 2);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.push(file_name(source).to_string_lossy().into_owned());
        parts.join(" ")
    }
}

impl Default for CommandToolchain {
    fn default() -> Self {
        Self::from_config(&ToolchainConfig::default())
    }
}

impl Toolchain for CommandToolchain {
    fn build_and_run(&self, workspace: &Path, source: &Path) -> Result<ToolchainOutput> {
        info!("{}", self.command_line(source));

        let launch_error = |source| TypeportError::ToolchainLaunch {
            program: self.program.clone(),
            source,
        };

        // Both streams share one pipe so the output keeps the order it was written in.
        let (mut reader, writer) = io::pipe().map_err(launch_error)?;
        let mut child = {
            let mut command = Command::new(&self.program);
            command
                .args(&self.args)
                .arg(file_name(source))
                .current_dir(workspace)
                .stdin(Stdio::null())
                .stdout(writer.try_clone().map_err(launch_error)?)
                .stderr(writer);
            command.spawn().map_err(launch_error)?
        };

        let mut raw = Vec::new();
        let read = reader.read_to_end(&mut raw);
        let status = child.wait()?;
        read?;
        let combined = String::from_utf8_lossy(&raw).into_owned();

        debug!(
            "Toolchain finished with {:?}, {} bytes of output",
            status,
            combined.len()
        );

        Ok(ToolchainOutput {
            success: status.success(),
            code: status.code(),
            output: combined,
        })
    }
}

fn file_name(source: &Path) -> &OsStr {
    source.file_name().unwrap_or(source.as_os_str())
}
