//! Temporary workspace holding the generated program.
//!
//! Both the directory and the program file are drop guards. The orchestrator
//! keeps them as locals, so they are removed on every way out of a run:
//! success, an early `?` return, or a panic unwinding through it. The file
//! guard is declared after the workspace and is therefore dropped first.

use crate::error::{Result, TypeportError};
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir, TempPath};
use tracing::{debug, warn};

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "transpiler_";

/// Name of the generated program inside a workspace.
pub const PROGRAM_FILE_NAME: &str = "transpiler.rs";

const PROGRAM_STEM: &str = "transpiler";
const PROGRAM_SUFFIX: &str = ".rs";

/// A uniquely named directory, removed when dropped.
///
/// Names are `transpiler_<timestamp>_<random>`; the random part keeps two
/// runs started within the same second apart.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Creates a fresh workspace under `working_dir`, creating `working_dir`
    /// first if needed.
    pub fn create(working_dir: &Path) -> Result<Self> {
        fs::create_dir_all(working_dir)
            .map_err(|err| TypeportError::workspace(working_dir, err))?;

        let prefix = format!("{}{}_", WORKSPACE_PREFIX, Utc::now().format("%Y%m%d%H%M%S"));
        let dir = Builder::new()
            .prefix(&prefix)
            .tempdir_in(working_dir)
            .map_err(|err| TypeportError::workspace(working_dir, err))?;

        let path = dir.path().to_path_buf();
        debug!("Created workspace {:?}", path);

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the program into the workspace as [`PROGRAM_FILE_NAME`].
    pub fn write_program(&self, contents: &str) -> Result<ProgramFile> {
        let path = self.path.join(PROGRAM_FILE_NAME);

        let mut file = Builder::new()
            .prefix(PROGRAM_STEM)
            .suffix(PROGRAM_SUFFIX)
            .rand_bytes(0)
            .tempfile_in(&self.path)
            .map_err(|err| TypeportError::workspace(&path, err))?;

        file.write_all(contents.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|err| TypeportError::workspace(&path, err))?;

        debug!("Wrote {} bytes to {:?}", contents.len(), path);

        Ok(ProgramFile {
            path: Some(file.into_temp_path()),
        })
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!("Removed workspace {:?}", self.path),
                Err(err) => warn!("Failed to remove workspace {:?}: {}", self.path, err),
            }
        }
    }
}

/// The generated program file, removed when dropped.
#[derive(Debug)]
pub struct ProgramFile {
    path: Option<TempPath>,
}

impl ProgramFile {
    pub fn path(&self) -> &Path {
        self.path
            .as_deref()
            .unwrap_or_else(|| Path::new(PROGRAM_FILE_NAME))
    }
}

impl Drop for ProgramFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let removed = path.to_path_buf();
            if let Err(err) = path.close() {
                warn!("Failed to remove {:?}: {}", removed, err);
            }
        }
    }
}

/// Lists the workspace directories currently present under `working_dir`.
pub fn leftover_workspaces(working_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(working_dir)? {
        let entry = entry?;
        let is_workspace = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(WORKSPACE_PREFIX));
        if is_workspace && entry.file_type()?.is_dir() {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_and_drop() {
        let working_dir = TempDir::new().unwrap();

        let workspace = Workspace::create(working_dir.path()).unwrap();
        let path = workspace.path().to_path_buf();

        assert!(path.is_dir());
        assert_eq!(path.parent(), Some(working_dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(WORKSPACE_PREFIX));

        drop(workspace);
        assert!(!path.exists());
    }

    #[test]
    fn test_create_missing_working_dir() {
        let root = TempDir::new().unwrap();
        let working_dir = root.path().join("nested/work");

        let workspace = Workspace::create(&working_dir).unwrap();

        assert!(workspace.path().starts_with(&working_dir));
    }

    #[test]
    fn test_create_fails_when_working_dir_is_a_file() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let err = Workspace::create(&blocker).unwrap_err();

        assert!(matches!(err, TypeportError::Workspace { .. }));
    }

    #[test]
    fn test_names_are_unique() {
        let working_dir = TempDir::new().unwrap();

        let first = Workspace::create(working_dir.path()).unwrap();
        let second = Workspace::create(working_dir.path()).unwrap();

        assert_ne!(first.path(), second.path());
        assert_eq!(leftover_workspaces(working_dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_write_program() {
        let working_dir = TempDir::new().unwrap();
        let workspace = Workspace::create(working_dir.path()).unwrap();

        let program = workspace.write_program("fn main() {}\n").unwrap();

        assert_eq!(program.path(), workspace.path().join(PROGRAM_FILE_NAME));
        assert_eq!(fs::read_to_string(program.path()).unwrap(), "fn main() {}\n");

        let file_path = program.path().to_path_buf();
        drop(program);
        assert!(!file_path.exists());
        assert!(workspace.path().exists());
    }

    #[test]
    fn test_program_written_once_per_workspace() {
        let working_dir = TempDir::new().unwrap();
        let workspace = Workspace::create(working_dir.path()).unwrap();

        let _program = workspace.write_program("a").unwrap();
        let err = workspace.write_program("b").unwrap_err();

        assert!(matches!(err, TypeportError::Workspace { .. }));
    }

    #[test]
    fn test_drop_removes_everything() {
        let working_dir = TempDir::new().unwrap();
        {
            let workspace = Workspace::create(working_dir.path()).unwrap();
            let _program = workspace.write_program("fn main() {}").unwrap();
        }
        assert!(leftover_workspaces(working_dir.path()).unwrap().is_empty());
    }
}
