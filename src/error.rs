use std::{io, path::PathBuf};
use thiserror::Error;

/// A pre-launch check or the launch itself failed.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("virtual environment directory does not exist: {}", .dir.display())]
    VenvDirMissing { dir: PathBuf },

    #[error("could not write {}: {source}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("python executable not found in virtual environment: {}", .path.display())]
    InterpreterMissing { path: PathBuf },

    #[error("entry script not found: {}", .path.display())]
    EntryScriptMissing { path: PathBuf },

    #[error("failed to start {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Spawn { .. } => -1,
            _ => 1,
        }
    }

    /// OS error code behind the failure, when the OS reported one.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            LaunchError::ConfigWrite { source, .. } | LaunchError::Spawn { source, .. } => {
                source.raw_os_error()
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ElevationError {
    #[error("user cancelled the elevation request")]
    Cancelled,
    #[error("elevation request failed (os error {code})")]
    Failed { code: u32 },
}
