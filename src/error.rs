use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClippingsError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ClippingsError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ClippingsError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClippingsError>;
