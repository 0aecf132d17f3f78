// Copyright 2025 Cornell University
// released under MIT License

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Everything that can stop a batch.
/// Malformed paths are not in here, they are filtered out (see `naming::NamingError`).
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("corpus root `{0}` does not exist or is not a directory")]
    MissingRoot(PathBuf),
    #[error("failed to find `{0}`, make sure it exists relative to the working directory!")]
    ToolNotFound(PathBuf),
    #[error("failed to start `{tool}`: {source}")]
    ToolSpawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("command `{command}` failed with {status}")]
    ToolFailed { command: String, status: ExitStatus },
    #[error("failed to create directory `{path}`: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to delete source file `{path}`: {source}")]
    RemoveSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open `{path}` for the output of the tool: {source}")]
    Redirect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, BatchError>;
