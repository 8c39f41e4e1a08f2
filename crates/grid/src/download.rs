//! Parallel download of per-train grid outputs

// standard library
use std::fs;
use std::path::{Path, PathBuf};

// crate modules
use crate::error::{Error, Result};
use crate::merge::{merge_outputs, MergeReport};
use crate::tools::{Catalog, Merger};

// external crates
use kdam::par_tqdm;
use log::{debug, info, warn};
use rayon::prelude::*;

/// Options shared by every download task
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOptions {
    /// Requested number of workers, capped at the number of CPUs
    pub jobs: usize,
    /// Outputs are slim, with results anywhere below the train directory
    pub slim: bool,
    /// Where train directories and listings are written
    pub work_dir: PathBuf,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            jobs: 20,
            slim: false,
            work_dir: PathBuf::from("."),
        }
    }
}

impl DownloadOptions {
    /// Number of worker threads actually used
    pub fn workers(&self) -> usize {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.jobs.clamp(1, cpus)
    }
}

/// Files fetched for a single train
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainDownload {
    /// Last component of the catalog directory, e.g. `hy_123456`
    pub train: String,
    /// Number of result files in the listing
    pub listed: usize,
    /// Result files fetched together with their AO2D
    pub copied: usize,
}

/// Outcome of one task, failures do not stop the others
#[derive(Debug)]
pub struct TaskOutcome {
    pub directory: String,
    pub result: Result<TrainDownload>,
}

/// Catalog directories from a text file, separated by commas or newlines
pub fn read_directories<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let text = fs::read_to_string(path.as_ref())?;
    let directories = text
        .lines()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect::<Vec<String>>();

    if directories.is_empty() {
        return Err(Error::NoDirectories {
            path: path.as_ref().display().to_string(),
        });
    }
    Ok(directories)
}

/// Train name, the last component of a catalog directory
///
/// ```rust
/// # use hfxs_grid::train_id;
/// assert_eq!(train_id("/alice/cern.ch/user/a/alihyperloop/outputs/0012/hy_123456"), "hy_123456");
/// assert_eq!(train_id("hy_1/"), "hy_1");
/// ```
pub fn train_id(directory: &str) -> &str {
    directory
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(directory)
}

/// Download every result file of one train and its AO2D sibling
///
/// Result files are listed with `AnalysisResults.root` searched recursively
/// for slim outputs, or `AOD/*/AnalysisResults.root` otherwise. An empty
/// listing is retried once with `*/AnalysisResults.root`. The listing is
/// kept as `outputs_<train>.txt`.
///
/// Each file `i` is copied to `<train>/AnalysisResults_{i:03}.root` and its
/// AO2D to `<train>/AO2D_{i:03}.root`. If the AO2D copy fails the results
/// copy is removed again so the pair stays consistent. Copies that already
/// exist are kept, so a task can be repeated safely.
pub fn download_train<C: Catalog + ?Sized>(
    catalog: &C,
    directory: &str,
    options: &DownloadOptions,
) -> Result<TrainDownload> {
    let train = train_id(directory).to_string();

    let mut listing = if options.slim {
        catalog.find(directory, "AnalysisResults.root", true)?
    } else {
        catalog.find(directory, "AOD/*/AnalysisResults.root", false)?
    };
    if listing.is_empty() {
        debug!("{train}: nothing listed, retrying with unmerged outputs");
        listing = catalog.find(directory, "*/AnalysisResults.root", false)?;
    }

    let listing_path = options.work_dir.join(format!("outputs_{train}.txt"));
    fs::write(&listing_path, listing.join("\n"))?;

    let train_dir = options.work_dir.join(&train);
    fs::create_dir_all(&train_dir)?;

    let mut copied = 0;
    for (i, source) in listing.iter().enumerate() {
        let results = train_dir.join(format!("AnalysisResults_{i:03}.root"));
        let aod = train_dir.join(format!("AO2D_{i:03}.root"));
        if results.exists() && aod.exists() {
            copied += 1;
            continue;
        }

        if let Err(e) = catalog.copy(source, &results) {
            warn!("{train}: unable to copy {source}: {e}");
            continue;
        }

        let aod_source = source.replace("AnalysisResults", "AO2D");
        match catalog.copy(&aod_source, &aod) {
            Ok(()) => copied += 1,
            Err(e) => {
                warn!("{train}: no AO2D for {source}, dropping results ({e})");
                if results.exists() {
                    fs::remove_file(&results)?;
                }
            }
        }
    }

    info!("{train}: {copied}/{} files downloaded", listing.len());
    Ok(TrainDownload {
        train,
        listed: listing.len(),
        copied,
    })
}

/// Download every train on a pool of `min(jobs, cpus)` workers
///
/// Failed tasks are logged and reported, they never stop the other tasks.
pub fn download_all<C: Catalog + ?Sized>(
    catalog: &C,
    directories: &[String],
    options: &DownloadOptions,
) -> Result<Vec<TaskOutcome>> {
    fs::create_dir_all(&options.work_dir)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers())
        .build()?;
    info!(
        "Downloading {} trains with {} workers",
        directories.len(),
        options.workers()
    );

    let outcomes: Vec<TaskOutcome> = pool.install(|| {
        par_tqdm!(
            directories.par_iter().map(|directory| TaskOutcome {
                directory: directory.clone(),
                result: download_train(catalog, directory, options),
            }),
            bar_format = "Downloading trains: {count}/{total} [{rate:.2} trains/s]  "
        )
        .collect()
    });
    eprintln!();

    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            warn!("Task for {} failed: {e}", outcome.directory);
        }
    }
    Ok(outcomes)
}

/// Download every train listed in `input_file`, then merge the outputs
///
/// Merging goes ahead with whatever was downloaded, failed tasks are only
/// reported.
pub fn download_and_merge<C: Catalog + ?Sized, M: Merger + ?Sized>(
    catalog: &C,
    merger: &M,
    input_file: &Path,
    options: &DownloadOptions,
    suffix: &str,
    n_merged: usize,
) -> Result<(Vec<TaskOutcome>, MergeReport)> {
    let directories = read_directories(input_file)?;
    let outcomes = download_all(catalog, &directories, options)?;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        warn!("{failed}/{} download tasks failed", outcomes.len());
    }

    let report = merge_outputs(merger, &options.work_dir, suffix, n_merged)?;
    Ok((outcomes, report))
}
