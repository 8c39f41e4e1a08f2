//! Download and merge behaviour against an in-memory catalog

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hfxs_grid::{
    download_all, download_train, merge_outputs, Catalog, DownloadOptions, Error, Merger, Result,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

/// Catalog with fixed listings that copies by writing the source path
#[derive(Default)]
struct FakeCatalog {
    listings: HashMap<(String, String), Vec<String>>,
    broken: HashSet<String>,
    missing: HashSet<String>,
    searches: Mutex<Vec<(String, String, bool)>>,
}

impl FakeCatalog {
    fn list(mut self, directory: &str, pattern: &str, files: &[&str]) -> Self {
        let files = files.iter().map(|f| format!("{directory}/{f}")).collect();
        self.listings
            .insert((directory.to_string(), pattern.to_string()), files);
        self
    }

    fn searches(&self) -> Vec<(String, String, bool)> {
        self.searches.lock().unwrap().clone()
    }
}

impl Catalog for FakeCatalog {
    fn find(&self, directory: &str, pattern: &str, recursive: bool) -> Result<Vec<String>> {
        self.searches.lock().unwrap().push((
            directory.to_string(),
            pattern.to_string(),
            recursive,
        ));
        if self.broken.contains(directory) {
            return Err(Error::CommandFailed {
                command: format!("alien_find {directory}"),
                code: Some(1),
            });
        }
        let key = (directory.to_string(), pattern.to_string());
        Ok(self.listings.get(&key).cloned().unwrap_or_default())
    }

    fn copy(&self, source: &str, destination: &Path) -> Result<()> {
        if self.missing.contains(source) {
            return Err(Error::CommandFailed {
                command: format!("alien_cp {source}"),
                code: Some(1),
            });
        }
        fs::write(destination, source)?;
        Ok(())
    }
}

/// Merger that records its inputs and writes empty outputs
#[derive(Default)]
struct FakeMerger {
    aod_bunches: RefCell<Vec<Vec<String>>>,
    results_inputs: RefCell<Vec<PathBuf>>,
}

impl Merger for FakeMerger {
    fn merge_aod(&self, list: &Path, output: &Path) -> Result<()> {
        let lines = fs::read_to_string(list)?
            .lines()
            .map(String::from)
            .collect();
        self.aod_bunches.borrow_mut().push(lines);
        fs::write(output, "")?;
        Ok(())
    }

    fn merge_results(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        self.results_inputs.borrow_mut().extend_from_slice(inputs);
        fs::write(output, "")?;
        Ok(())
    }
}

const AOD: &str = "AOD/*/AnalysisResults.root";
const UNMERGED: &str = "*/AnalysisResults.root";

#[fixture]
fn work_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn options(work_dir: &TempDir, slim: bool) -> DownloadOptions {
    DownloadOptions {
        jobs: 2,
        slim,
        work_dir: work_dir.path().to_path_buf(),
    }
}

#[rstest]
fn empty_listing_is_retried_once(work_dir: TempDir) {
    let catalog = FakeCatalog::default().list(
        "/out/hy_1",
        UNMERGED,
        &["001/AnalysisResults.root", "002/AnalysisResults.root"],
    );
    let download = download_train(&catalog, "/out/hy_1", &options(&work_dir, false)).unwrap();

    assert_eq!(download.train, "hy_1");
    assert_eq!((download.listed, download.copied), (2, 2));
    assert_eq!(
        catalog.searches(),
        vec![
            ("/out/hy_1".to_string(), AOD.to_string(), false),
            ("/out/hy_1".to_string(), UNMERGED.to_string(), false),
        ]
    );

    let listing = fs::read_to_string(work_dir.path().join("outputs_hy_1.txt")).unwrap();
    assert_eq!(listing.lines().count(), 2);

    let aod = fs::read_to_string(work_dir.path().join("hy_1/AO2D_001.root")).unwrap();
    assert_eq!(aod, "/out/hy_1/002/AO2D.root");
}

#[rstest]
fn slim_outputs_search_recursively(work_dir: TempDir) {
    let catalog = FakeCatalog::default().list(
        "/out/hy_2",
        "AnalysisResults.root",
        &["a/b/AnalysisResults.root"],
    );
    let download = download_train(&catalog, "/out/hy_2", &options(&work_dir, true)).unwrap();

    assert_eq!(download.copied, 1);
    assert_eq!(catalog.searches().len(), 1);
    assert!(catalog.searches()[0].2);
}

#[rstest]
fn results_without_aod_are_removed(work_dir: TempDir) {
    let mut catalog = FakeCatalog::default().list(
        "/out/hy_3",
        AOD,
        &["AOD/001/AnalysisResults.root", "AOD/002/AnalysisResults.root"],
    );
    catalog
        .missing
        .insert("/out/hy_3/AOD/002/AO2D.root".to_string());

    let download = download_train(&catalog, "/out/hy_3", &options(&work_dir, false)).unwrap();
    assert_eq!((download.listed, download.copied), (2, 1));

    let train = work_dir.path().join("hy_3");
    assert!(train.join("AnalysisResults_000.root").exists());
    assert!(train.join("AO2D_000.root").exists());
    assert!(!train.join("AnalysisResults_001.root").exists());
    assert!(!train.join("AO2D_001.root").exists());
}

#[rstest]
fn repeated_download_keeps_existing_pairs(work_dir: TempDir) {
    let catalog = FakeCatalog::default().list("/out/hy_4", AOD, &["AOD/001/AnalysisResults.root"]);
    let options = options(&work_dir, false);
    download_train(&catalog, "/out/hy_4", &options).unwrap();
    let again = download_train(&catalog, "/out/hy_4", &options).unwrap();
    assert_eq!(again.copied, 1);
}

#[rstest]
fn failed_tasks_do_not_stop_others(work_dir: TempDir) {
    let mut catalog = FakeCatalog::default()
        .list("/out/hy_1", AOD, &["AOD/001/AnalysisResults.root"])
        .list("/out/hy_2", AOD, &["AOD/001/AnalysisResults.root"]);
    catalog.broken.insert("/out/hy_bad".to_string());

    let directories = ["/out/hy_1", "/out/hy_bad", "/out/hy_2"].map(String::from);
    let outcomes = download_all(&catalog, &directories, &options(&work_dir, false)).unwrap();

    assert_eq!(outcomes.len(), 3);
    let failed = outcomes
        .iter()
        .filter(|o| o.result.is_err())
        .map(|o| o.directory.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(failed, vec!["/out/hy_bad"]);
    assert!(work_dir.path().join("hy_1/AO2D_000.root").exists());
    assert!(work_dir.path().join("hy_2/AO2D_000.root").exists());
}

fn downloaded(work_dir: &TempDir, trains: &[(&str, usize)]) {
    let mut catalog = FakeCatalog::default();
    for (train, n) in trains {
        let files = (0..*n)
            .map(|i| format!("AOD/{i:03}/AnalysisResults.root"))
            .collect::<Vec<String>>();
        let files = files.iter().map(String::as_str).collect::<Vec<&str>>();
        catalog = catalog.list(&format!("/out/{train}"), AOD, &files);
    }
    let directories = trains
        .iter()
        .map(|(t, _)| format!("/out/{t}"))
        .collect::<Vec<String>>();
    download_all(&catalog, &directories, &options(work_dir, false)).unwrap();
}

#[rstest]
fn merge_in_bunches_and_clean_up(work_dir: TempDir) {
    downloaded(&work_dir, &[("hy_1", 2), ("hy_2", 2), ("hy_3", 1)]);
    fs::write(work_dir.path().join("unrelated.txt"), "keep").unwrap();

    let merger = FakeMerger::default();
    let report = merge_outputs(&merger, work_dir.path(), "_test", 2).unwrap();

    assert_eq!(report.inputs, 5);
    assert_eq!(
        report.aod,
        vec![
            work_dir.path().join("AO2D_test_0.root"),
            work_dir.path().join("AO2D_test_1.root"),
        ]
    );
    let bunch_sizes = merger
        .aod_bunches
        .borrow()
        .iter()
        .map(Vec::len)
        .collect::<Vec<usize>>();
    assert_eq!(bunch_sizes, vec![3, 2]);
    assert_eq!(merger.results_inputs.borrow().len(), 5);
    assert_eq!(report.results, work_dir.path().join("AnalysisResults_test.root"));

    // only merged outputs and unrelated files are left
    let mut left = fs::read_dir(work_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<Vec<String>>();
    left.sort();
    assert_eq!(
        left,
        vec![
            "AO2D_test_0.root",
            "AO2D_test_1.root",
            "AnalysisResults_test.root",
            "unrelated.txt"
        ]
    );
}

#[rstest]
fn single_bunch_has_no_index(work_dir: TempDir) {
    downloaded(&work_dir, &[("hy_1", 3)]);
    let report = merge_outputs(&FakeMerger::default(), work_dir.path(), "_pass1", 1).unwrap();
    assert_eq!(report.aod, vec![work_dir.path().join("AO2D_pass1.root")]);
}

#[rstest]
fn nothing_to_merge(work_dir: TempDir) {
    assert!(matches!(
        merge_outputs(&FakeMerger::default(), work_dir.path(), "", 1),
        Err(Error::NothingToMerge)
    ));
}
