//! YAML configuration for the raw-yield extraction

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

// crate modules
use crate::error::{Error, Result};
use crate::model::{BackgroundShape, SignalShape};

// external crates
use serde::{Deserialize, Serialize};

/// Full configuration of a raw-yield extraction
///
/// ```yaml
/// inputs: { data: [data.csv], mc: [mc.csv] }
/// selections: { pt_mins: [2, 4], pt_maxs: [4, 6], bdt_sel: [0.5, 0.6] }
/// fit_configs:
///   mass_limits: [[4.9, 5.66], [4.9, 5.66]]
///   signal_funcs: [[gaussian], [gaussian]]
///   bkg_funcs: [[expo], [expo]]
///   use_bkg_templ: [false, true]
/// outputs: { directory: out, suffix: _test }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    pub inputs: FitInputs,
    pub selections: Selections,
    pub fit_configs: FitSettings,
    pub outputs: FitOutputs,
}

/// Candidate tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitInputs {
    pub data: Vec<PathBuf>,
    pub mc: Vec<PathBuf>,
}

/// Kinematic intervals and the classifier cut applied in each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selections {
    pub pt_mins: Vec<f64>,
    pub pt_maxs: Vec<f64>,
    pub bdt_sel: Vec<f64>,
}

impl Selections {
    /// Number of pT intervals
    pub fn len(&self) -> usize {
        self.pt_mins.len()
    }

    /// True if there are no intervals
    pub fn is_empty(&self) -> bool {
        self.pt_mins.is_empty()
    }

    /// Interval edges, every lower edge then the final upper edge
    pub fn pt_edges(&self) -> Vec<f64> {
        let mut edges = self.pt_mins.clone();
        if let Some(last) = self.pt_maxs.last() {
            edges.push(*last);
        }
        edges
    }

    /// `(pt_min, pt_max, bdt_cut)` for every interval
    pub fn intervals(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.pt_mins
            .iter()
            .zip(&self.pt_maxs)
            .zip(&self.bdt_sel)
            .map(|((lo, hi), cut)| (*lo, *hi, *cut))
    }
}

/// Fit settings, one entry per pT interval where a list is expected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSettings {
    /// Nominal mass of the particle in GeV/c2
    #[serde(default = "default_particle_mass")]
    pub particle_mass: f64,
    /// Number of mass bins in every fit
    #[serde(default = "default_nbins")]
    pub nbins: usize,
    pub mass_limits: Vec<[f64; 2]>,
    pub signal_funcs: Vec<Vec<SignalShape>>,
    pub bkg_funcs: Vec<Vec<BackgroundShape>>,
    pub use_bkg_templ: Vec<bool>,
    /// Optional fit of every selected candidate at once
    #[serde(default)]
    pub pt_int: Option<PtIntegratedFit>,
}

/// Settings of the pT-integrated fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtIntegratedFit {
    #[serde(default)]
    pub activate: bool,
    pub mass_limits: [f64; 2],
    pub signal_funcs: Vec<SignalShape>,
    pub bkg_funcs: Vec<BackgroundShape>,
    #[serde(default)]
    pub use_bkg_templ: bool,
}

/// Output location, the store is `<directory>/B0_mass<suffix>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOutputs {
    pub directory: PathBuf,
    #[serde(default)]
    pub suffix: String,
}

impl FitOutputs {
    /// Full path of the output store
    pub fn store_path(&self) -> PathBuf {
        self.directory.join(format!("B0_mass{}.json", self.suffix))
    }
}

impl FitConfig {
    /// Read from a YAML file and check the per-interval lists
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Every per-interval list must have one entry per pT interval
    pub fn validate(&self) -> Result<()> {
        let expected = self.selections.len();
        let settings = &self.fit_configs;
        let lengths = [
            ("pt_maxs", self.selections.pt_maxs.len()),
            ("bdt_sel", self.selections.bdt_sel.len()),
            ("mass_limits", settings.mass_limits.len()),
            ("signal_funcs", settings.signal_funcs.len()),
            ("bkg_funcs", settings.bkg_funcs.len()),
            ("use_bkg_templ", settings.use_bkg_templ.len()),
        ];

        for (field, found) in lengths {
            if found != expected {
                return Err(Error::ConfigLength {
                    field,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

fn default_particle_mass() -> f64 {
    5.27966
}

fn default_nbins() -> usize {
    56
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "
inputs: { data: [a.csv], mc: [b.csv] }
selections: { pt_mins: [2, 4], pt_maxs: [4, 6], bdt_sel: [0.5, 0.6] }
fit_configs:
  mass_limits: [[4.9, 5.66], [4.9, 5.66]]
  signal_funcs: [[gaussian], [gaussian]]
  bkg_funcs: [[expo], [pol1, nobkg]]
  use_bkg_templ: [false, true]
  pt_int: { activate: true, mass_limits: [4.9, 5.66], signal_funcs: [gaussian], bkg_funcs: [expo] }
outputs: { directory: out, suffix: _test }
";

    #[test]
    fn defaults_and_names() {
        let config: FitConfig = serde_yaml::from_str(CONFIG).unwrap();
        config.validate().unwrap();

        assert_eq!(config.fit_configs.nbins, 56);
        assert_eq!(config.fit_configs.particle_mass, 5.27966);
        assert_eq!(
            config.fit_configs.bkg_funcs[1],
            vec![BackgroundShape::Pol1, BackgroundShape::NoBkg]
        );
        assert_eq!(config.selections.pt_edges(), vec![2.0, 4.0, 6.0]);
        assert_eq!(
            config.outputs.store_path(),
            PathBuf::from("out/B0_mass_test.json")
        );

        let pt_int = config.fit_configs.pt_int.unwrap();
        assert!(pt_int.activate);
        assert!(!pt_int.use_bkg_templ);
    }

    #[test]
    fn mismatched_lists() {
        let mut config: FitConfig = serde_yaml::from_str(CONFIG).unwrap();
        config.fit_configs.use_bkg_templ.pop();
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigLength {
                field: "use_bkg_templ",
                expected: 2,
                found: 1
            })
        ));
    }
}
