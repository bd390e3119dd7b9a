//! Typed errors for the core. Only the genuinely fatal conditions of the
//! spec's error model (open failure, allocation failure) are represented
//! here; everything else (short reads, corrupt OOB, missing chunks, ...)
//! is recovered locally and reported through the [`log`] facade instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("failed to open data dump {}: {source}", path.display())]
    OpenData {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open OOB dump {}: {source}", path.display())]
    OpenOob {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("allocation failed while building the index: {0}")]
    Allocation(String),

    #[error("I/O error while scanning the dump: {0}")]
    Scan(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReconError>;
