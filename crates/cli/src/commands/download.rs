//! `hfxs download`

// standard library
use std::path::PathBuf;

// crate modules
use super::CommandResult;

// external crates
use clap::Args;
use hfxs_grid::{download_and_merge, AlienCatalog, DownloadOptions, O2Merger};
use log::warn;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Text file of catalog directories, separated by commas or newlines
    pub input: PathBuf,

    /// Parallel download tasks, capped at the number of CPUs
    #[arg(short, long, default_value_t = 20)]
    pub jobs: usize,

    /// Outputs are slim, results anywhere below the train directory
    #[arg(long)]
    pub slim: bool,

    /// Appended to the merged file names
    #[arg(short, long, default_value = "")]
    pub suffix: String,

    /// Number of merged AO2D files
    #[arg(short, long, default_value_t = 1)]
    pub n_merged: usize,

    /// Where trains are downloaded and merged
    #[arg(short, long, default_value = ".")]
    pub work_dir: PathBuf,

    /// Largest merged AO2D in bytes
    #[arg(long, default_value_t = 1_000_000_000)]
    pub max_size: u64,
}

pub fn run(args: &DownloadArgs) -> CommandResult {
    let options = DownloadOptions {
        jobs: args.jobs,
        slim: args.slim,
        work_dir: args.work_dir.clone(),
    };
    let merger = O2Merger {
        max_size: args.max_size,
    };

    let (tasks, report) = download_and_merge(
        &AlienCatalog,
        &merger,
        &args.input,
        &options,
        &args.suffix,
        args.n_merged,
    )?;

    for task in &tasks {
        match &task.result {
            Ok(train) => println!("{:<12} {}/{} files", train.train, train.copied, train.listed),
            Err(e) => warn!("{} failed: {e}", task.directory),
        }
    }
    for aod in &report.aod {
        println!("merged {}", aod.display());
    }
    println!("merged {}", report.results.display());
    Ok(())
}
