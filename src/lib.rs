//! Reconstructs a filesystem image from a raw NAND dump (data area + OOB
//! area) of a log-structured, out-of-place-update flash filesystem.
//!
//! The core is a two-phase pipeline: [`index::build_index`] scans every
//! physical page once and resolves log-structured overwrites into a Page
//! Index and Object Table ("Phase 1"), and [`walker::walk_and_extract`]
//! walks that Object Table, recreating directories and delegating file
//! objects to [`extractor::extract_file`] ("Phase 2").

pub mod bytes;
pub mod classify;
pub mod error;
pub mod extractor;
pub mod geometry;
pub mod index;
pub mod page_source;
pub mod sanitize;
pub mod walker;

pub use error::{ReconError, Result};
pub use geometry::Geometry;
pub use walker::WalkSummary;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use index::build_index;
use page_source::PageSource;
use walker::walk_and_extract;

/// Runs both phases end to end: opens the two dumps, builds the index,
/// and reconstructs the directory tree under `output_dir`.
pub fn reconstruct(
    data_path: &Path,
    oob_path: &Path,
    output_dir: &Path,
    geometry: Geometry,
) -> Result<WalkSummary> {
    let data = File::open(data_path).map_err(|source| ReconError::OpenData {
        path: data_path.to_path_buf(),
        source,
    })?;
    let oob = File::open(oob_path).map_err(|source| ReconError::OpenOob {
        path: oob_path.to_path_buf(),
        source,
    })?;

    fs::create_dir_all(output_dir).map_err(|source| ReconError::CreateOutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut source = PageSource::new(BufReader::new(data), BufReader::new(oob), geometry);

    let index = build_index(&mut source)?;
    let summary = walk_and_extract(&mut source, &index, output_dir)?;

    Ok(summary)
}
