//! Merging downloaded train outputs into a few large files

// standard library
use std::fs;
use std::path::{Path, PathBuf};

// crate modules
use crate::error::{Error, Result};
use crate::tools::Merger;

// external crates
use log::{debug, info};

/// Files produced by a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Merged derived-data files, one per bunch
    pub aod: Vec<PathBuf>,
    /// Merged analysis results
    pub results: PathBuf,
    /// Number of AO2D inputs
    pub inputs: usize,
}

/// Split `files` into at most `n` bunches of `ceil(len / n)` files
///
/// ```rust
/// # use hfxs_grid::bunches;
/// let files = (0..7).collect::<Vec<u32>>();
/// let split = bunches(&files, 3);
///
/// assert_eq!(split, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
/// assert_eq!(bunches(&files, 1).len(), 1);
/// ```
pub fn bunches<T: Clone>(files: &[T], n: usize) -> Vec<Vec<T>> {
    if files.is_empty() {
        return Vec::new();
    }
    let per_bunch = files.len().div_ceil(n.max(1));
    files.chunks(per_bunch).map(|c| c.to_vec()).collect()
}

/// Name of the merged AO2D file for bunch `k` out of `total`
pub fn merged_aod_name(suffix: &str, k: usize, total: usize) -> String {
    if total > 1 {
        format!("AO2D{suffix}_{k}.root")
    } else {
        format!("AO2D{suffix}.root")
    }
}

/// Train directories in `work_dir`, those with `hy_` in the name
fn train_dirs(work_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(work_dir)? {
        let path = entry?.path();
        let is_train = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().contains("hy_"));
        if path.is_dir() && is_train {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Files within the train directories whose names contain `pattern`
fn files_containing(dirs: &[PathBuf], pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dir in dirs {
        let mut found = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().contains(pattern))
            {
                found.push(path);
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

/// Merge everything downloaded into `work_dir`
///
/// AO2D files are split into `n_merged` bunches, each merged into
/// `AO2D{suffix}_{k}.root` (or `AO2D{suffix}.root` for a single bunch). All
/// analysis results are added into `AnalysisResults{suffix}.root`. The train
/// directories, listings and bunch lists are removed afterwards.
pub fn merge_outputs<M: Merger + ?Sized>(
    merger: &M,
    work_dir: &Path,
    suffix: &str,
    n_merged: usize,
) -> Result<MergeReport> {
    let dirs = train_dirs(work_dir)?;
    let aod_files = files_containing(&dirs, "AO2D")?;
    if aod_files.is_empty() {
        return Err(Error::NothingToMerge);
    }

    let split = bunches(&aod_files, n_merged);
    let mut aod = Vec::with_capacity(split.len());
    for (k, bunch) in split.iter().enumerate() {
        let list = work_dir.join(format!("files_to_merge_{k}.txt"));
        let lines = bunch
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<String>>();
        fs::write(&list, lines.join("\n") + "\n")?;

        let output = work_dir.join(merged_aod_name(suffix, k, split.len()));
        debug!("Merging {} files into {}", bunch.len(), output.display());
        merger.merge_aod(&list, &output)?;
        aod.push(output);
    }

    let results_files = files_containing(&dirs, "AnalysisResults")?;
    let results = work_dir.join(format!("AnalysisResults{suffix}.root"));
    merger.merge_results(&results_files, &results)?;

    cleanup(work_dir, &dirs)?;
    info!(
        "Merged {} AO2D files into {} output(s)",
        aod_files.len(),
        aod.len()
    );

    Ok(MergeReport {
        aod,
        results,
        inputs: aod_files.len(),
    })
}

/// Remove train directories, listings and bunch lists
fn cleanup(work_dir: &Path, dirs: &[PathBuf]) -> Result<()> {
    for dir in dirs {
        fs::remove_dir_all(dir)?;
    }
    for entry in fs::read_dir(work_dir)? {
        let path = entry?.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let intermediate = name.starts_with("outputs_hy_") || name.starts_with("files_to_merge_");
        if path.is_file() && intermediate {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bunch_edge_cases() {
        assert!(bunches::<u8>(&[], 3).is_empty());
        assert_eq!(bunches(&[1, 2], 5), vec![vec![1], vec![2]]);
        assert_eq!(bunches(&[1, 2, 3], 0), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn aod_names() {
        assert_eq!(merged_aod_name("_pass1", 0, 1), "AO2D_pass1.root");
        assert_eq!(merged_aod_name("_pass1", 2, 3), "AO2D_pass1_2.root");
    }
}
