use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypeportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to scan {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    #[error("Parse error in file {file}: {message}")]
    ParseError { file: PathBuf, message: String },

    #[error("Workspace error at {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch toolchain `{program}`: {source}")]
    ToolchainLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The output is logged when the failure is detected and kept here for
    /// callers; it is not repeated in the message.
    #[error("Build failed ({status})")]
    Build { status: String, output: String },

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

impl From<regex::Error> for TypeportError {
    fn from(err: regex::Error) -> Self {
        TypeportError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TypeportError>;

impl TypeportError {
    pub fn config(message: impl Into<String>) -> Self {
        TypeportError::Config(message.into())
    }

    pub fn discovery(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        TypeportError::Discovery {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn parse_error(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        TypeportError::ParseError {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn workspace(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TypeportError::Workspace {
            path: path.into(),
            source,
        }
    }

    /// True for the failures that happen inside the generated program's build
    /// or run, including a conversion facility error.
    pub fn is_build_failure(&self) -> bool {
        matches!(
            self,
            TypeportError::Build { .. } | TypeportError::ToolchainLaunch { .. }
        )
    }
}
