// src/error.rs

use std::io;
use std::path::PathBuf;

use strum_macros::Display;
use thiserror::Error;

/// Why an input resource could not be turned into records.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read file: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pickle stream: {0}")]
    Pickle(#[from] serde_pickle::Error),

    #[error("file format '{0}' is not supported")]
    UnsupportedFormat(String),
}

/// Why the output table could not be written.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not move temporary file into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InputKind {
    #[strum(serialize = "order collection")]
    Orders,
    #[strum(serialize = "VIP list")]
    VipList,
}

/// Fatal job failure, naming the stage and the offending path.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("load stage failed: could not load {kind} from {}", path.display())]
    DataLoad {
        kind: InputKind,
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("write stage failed: could not write {}", path.display())]
    DataWrite {
        path: PathBuf,
        #[source]
        source: WriteError,
    },
}

impl JobError {
    pub fn load(kind: InputKind, path: impl Into<PathBuf>, source: LoadError) -> Self {
        JobError::DataLoad {
            kind,
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: WriteError) -> Self {
        JobError::DataWrite {
            path: path.into(),
            source,
        }
    }
}
