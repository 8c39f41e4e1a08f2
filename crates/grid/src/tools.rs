//! External grid and merging tools behind small traits

// standard library
use std::path::{Path, PathBuf};
use std::process::Command;

// crate modules
use crate::error::{Error, Result};

// external crates
use log::trace;

/// A file catalog that can be searched and copied from
pub trait Catalog: Sync {
    /// Paths of every file under `directory` matching `pattern`
    fn find(&self, directory: &str, pattern: &str, recursive: bool) -> Result<Vec<String>>;

    /// Copy a catalog file to a local path
    fn copy(&self, source: &str, destination: &Path) -> Result<()>;
}

/// Tools that combine downloaded files
pub trait Merger {
    /// Merge the AO2D files listed one per line in `list` into `output`
    fn merge_aod(&self, list: &Path, output: &Path) -> Result<()>;

    /// Add up analysis result files into `output`
    fn merge_results(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

/// The AliEn grid catalog through `alien_find` and `alien_cp`
#[derive(Debug, Clone, Default)]
pub struct AlienCatalog;

impl Catalog for AlienCatalog {
    fn find(&self, directory: &str, pattern: &str, recursive: bool) -> Result<Vec<String>> {
        let mut command = Command::new("alien_find");
        command.arg(format!("alien://{directory}")).arg(pattern);
        if recursive {
            command.arg("-r");
        }

        let stdout = run(&mut command)?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn copy(&self, source: &str, destination: &Path) -> Result<()> {
        let mut command = Command::new("alien_cp");
        command
            .arg(source)
            .arg(format!("file:{}", destination.display()));
        run(&mut command).map(|_| ())
    }
}

/// `o2-aod-merger` for derived data and `hadd` for analysis results
#[derive(Debug, Clone)]
pub struct O2Merger {
    /// Maximum size of a merged AO2D file in bytes
    pub max_size: u64,
}

impl Default for O2Merger {
    fn default() -> Self {
        Self {
            max_size: 1_000_000_000,
        }
    }
}

impl Merger for O2Merger {
    fn merge_aod(&self, list: &Path, output: &Path) -> Result<()> {
        let mut command = Command::new("o2-aod-merger");
        command
            .arg("--input")
            .arg(list)
            .arg("--output")
            .arg(output)
            .arg("--max-size")
            .arg(self.max_size.to_string())
            .arg("--skip-parent-files-list");
        run(&mut command).map(|_| ())
    }

    fn merge_results(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let mut command = Command::new("hadd");
        command.arg("-f").arg(output).args(inputs);
        run(&mut command).map(|_| ())
    }
}

/// Run a command to completion, returning its standard output
fn run(command: &mut Command) -> Result<String> {
    let program = command.get_program().to_string_lossy().into_owned();
    trace!("Running {command:?}");

    let output = command.output().map_err(|source| Error::MissingTool {
        program: program.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: format!("{command:?}"),
            code: output.status.code(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program() {
        let mut command = Command::new("hfxs-surely-not-a-real-program");
        assert!(matches!(run(&mut command), Err(Error::MissingTool { .. })));
    }
}
