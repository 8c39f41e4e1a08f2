//! YAML configuration for the cross-section procedures

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

// crate modules
use crate::error::Result;

// external crates
use serde::{Deserialize, Serialize};

/// Configuration for [integrate](crate::integrate())
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrateConfig {
    pub inputs: IntegrateInputs,
    #[serde(default)]
    pub systematics: Systematics,
    pub output: Output,
}

/// Input files for the integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrateInputs {
    /// Store with the differential cross section and systematics
    pub cross_section: PathBuf,
    /// Store with the theory extrapolation graph
    #[serde(alias = "nnlo_nnll")]
    pub extrapolation: PathBuf,
    /// Name of the extrapolation graph
    #[serde(default = "default_extrapolation_object")]
    pub extrapolation_object: String,
    /// Name of the statistical histogram
    #[serde(default = "default_stat_object")]
    pub stat_object: String,
}

/// Names of systematic sources by correlation across bins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Systematics {
    #[serde(default)]
    pub correlated: Vec<String>,
    #[serde(default)]
    pub uncorrelated: Vec<String>,
}

/// Output location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Output {
    /// Full path of the output store
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl IntegrateConfig {
    /// Read from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_yaml(path)
    }
}

/// Configuration for [generator_cross_section](crate::generator_cross_section())
///
/// ```yaml
/// inputs:
///   folder: simulations
///   mode: monash
/// pt:
///   mins: [1, 2, 4]
///   maxs: [2, 4, 6]
/// output: pythia_cross_section.json
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub inputs: GeneratorInputs,
    pub pt: PtBins,
    /// Absolute PDG code of the particle of interest
    #[serde(default = "default_pdg")]
    pub pdg: i32,
    /// Maximum absolute rapidity
    #[serde(default = "default_y_max")]
    pub y_max: f64,
    /// Output store path
    pub output: PathBuf,
}

/// Where the generator runs live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorInputs {
    pub folder: PathBuf,
    /// Tune or production mode, also the subdirectory name
    pub mode: String,
    /// File stem pattern of the candidate tables within the mode directory
    #[serde(default = "default_run_pattern")]
    pub pattern: String,
}

impl GeneratorInputs {
    /// Glob pattern matching every candidate table
    pub fn glob_pattern(&self) -> String {
        self.folder
            .join(&self.mode)
            .join(format!("{}.csv", self.pattern))
            .to_string_lossy()
            .into_owned()
    }
}

/// Lower and upper edges of the pT intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtBins {
    pub mins: Vec<f64>,
    pub maxs: Vec<f64>,
}

impl GeneratorConfig {
    /// Read from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_yaml(path)
    }
}

fn read_yaml<T: serde::de::DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_yaml::from_reader(reader)?)
}

fn default_extrapolation_object() -> String {
    "g_extrap".to_string()
}

fn default_stat_object() -> String {
    "h_stat".to_string()
}

fn default_run_pattern() -> String {
    "*_seed*".to_string()
}

fn default_pdg() -> i32 {
    511
}

fn default_y_max() -> f64 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_defaults() {
        let text = "
inputs:
  cross_section: cs.json
  nnlo_nnll: theory.json
systematics:
  correlated: [tracking]
output:
  dir: out
  file_name: integrated.json
";
        let config: IntegrateConfig = serde_yaml::from_str(text).unwrap();
        assert_eq!(config.inputs.extrapolation, PathBuf::from("theory.json"));
        assert_eq!(config.inputs.extrapolation_object, "g_extrap");
        assert_eq!(config.inputs.stat_object, "h_stat");
        assert!(config.systematics.uncorrelated.is_empty());
        assert_eq!(config.output.path(), PathBuf::from("out/integrated.json"));
    }

    #[test]
    fn generator_defaults() {
        let text = "
inputs: { folder: sims, mode: monash }
pt: { mins: [1, 2], maxs: [2, 4] }
output: out.json
";
        let config: GeneratorConfig = serde_yaml::from_str(text).unwrap();
        assert_eq!(config.pdg, 511);
        assert_eq!(config.y_max, 0.5);
        assert_eq!(config.inputs.glob_pattern(), "sims/monash/*_seed*.csv");
    }
}
