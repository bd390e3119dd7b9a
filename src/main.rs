use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use yaffs_recon::{reconstruct, Geometry};

/// Reconstruct a directory tree from a raw NAND dump of a log-structured
/// flash filesystem (data-area dump + out-of-band dump).
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the data-area dump (page payloads)
    data: PathBuf,

    /// Path to the out-of-band dump (per-page metadata)
    oob: PathBuf,

    /// Directory to write the reconstructed tree into (created if absent)
    output: PathBuf,

    /// Bytes of data payload per page
    #[arg(long, default_value_t = Geometry::default().page_size)]
    page_size: usize,

    /// Bytes of out-of-band metadata per page
    #[arg(long, default_value_t = Geometry::default().oob_size)]
    oob_size: usize,

    /// Pages per erase block
    #[arg(long, default_value_t = Geometry::default().block_pages)]
    block_pages: usize,

    /// Upper bound on pages scanned
    #[arg(long, default_value_t = Geometry::default().max_pages)]
    max_pages: u32,

    /// Upper bound on logical object ids
    #[arg(long, default_value_t = Geometry::default().max_objects)]
    max_objects: u32,

    /// Increase diagnostic verbosity (-v for debug, -vv for per-chunk traces)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let geometry = Geometry {
        page_size: args.page_size,
        oob_size: args.oob_size,
        block_pages: args.block_pages,
        max_pages: args.max_pages,
        max_objects: args.max_objects,
    };

    info!(
        "reconstructing {} / {} into {}",
        args.data.display(),
        args.oob.display(),
        args.output.display()
    );

    match reconstruct(&args.data, &args.oob, &args.output, geometry) {
        Ok(summary) => {
            info!(
                "done: {} directories, {} files, {} chunks padded",
                summary.directories_created, summary.files_extracted, summary.chunks_padded
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
