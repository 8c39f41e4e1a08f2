//! Generator-level cross section from event generator runs
//!
//! Every run is a pair of files sharing a stem: a candidate table
//! (`<stem>.csv`, columns `pdg,pt,y`) and a store (`<stem>.json` or
//! `<stem>.bin`) holding `hSigmaGen` and `hAcceptedEvents`.

// standard library
use std::path::{Path, PathBuf};

// crate modules
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};

// external crates
use hfxs_hist::{Hist1D, Store};
use log::{debug, info, warn};
use serde::Deserialize;

/// A generated particle
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Candidate {
    pub pdg: i32,
    pub pt: f64,
    pub y: f64,
}

/// Output of a single generator run
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorRun {
    /// Generated cross section in mb
    pub sigma_gen: f64,
    /// Number of accepted events
    pub n_accepted: f64,
    pub candidates: Vec<Candidate>,
}

impl GeneratorRun {
    /// Read a run from its candidate table and the sibling store
    pub fn read<P: AsRef<Path>>(csv_path: P) -> Result<Self> {
        let csv_path = csv_path.as_ref();
        let store = Store::read(sibling_store(csv_path)?)?;

        let first = |key: &str| -> Result<f64> {
            let hist = store.get_hist(key)?;
            Ok(hist.contents.first().copied().unwrap_or_default())
        };
        let sigma_gen = first("hSigmaGen")?;
        let n_accepted = first("hAcceptedEvents")?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(csv_path)?;
        let candidates = reader
            .deserialize::<Candidate>()
            .collect::<std::result::Result<Vec<Candidate>, csv::Error>>()?;

        debug!(
            "{}: {} candidates, {n_accepted} accepted events",
            csv_path.display(),
            candidates.len()
        );
        Ok(Self {
            sigma_gen,
            n_accepted,
            candidates,
        })
    }
}

/// Find the `.json` or `.bin` store next to a candidate table
fn sibling_store(csv_path: &Path) -> Result<PathBuf> {
    ["json", "bin"]
        .iter()
        .map(|ext| csv_path.with_extension(ext))
        .find(|p| p.exists())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no store next to {}", csv_path.display()),
            )
            .into()
        })
}

/// Read every run matching the configured pattern
///
/// Runs with a missing or broken file are skipped with a warning.
pub fn collect_runs(config: &GeneratorConfig) -> Result<Vec<GeneratorRun>> {
    let pattern = config.inputs.glob_pattern();
    let mut runs = Vec::new();

    for entry in glob::glob(&pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable path: {e}");
                continue;
            }
        };
        match GeneratorRun::read(&path) {
            Ok(run) => runs.push(run),
            Err(e) => warn!("Skipping {}: {e}", path.display()),
        }
    }

    if runs.is_empty() {
        return Err(Error::NoGeneratorRuns { pattern });
    }
    info!("Found {} generator runs", runs.len());
    Ok(runs)
}

/// pT-differential cross section in µb/(GeV/c)
///
/// Counts particles with `|pdg|` equal to `pdg`, `pt_min <= pt < pt_max`
/// and `|y| < y_max`. The generated cross section is averaged over runs and
/// the accepted events summed. The result is halved to average particle and
/// antiparticle, then divided by the interval width.
///
/// ```rust
/// # use hfxs_xsec::{generator_cross_section, Candidate, GeneratorRun};
/// let run = GeneratorRun {
///     sigma_gen: 2.0,
///     n_accepted: 1000.0,
///     candidates: vec![
///         Candidate { pdg: 511, pt: 1.5, y: 0.1 },
///         Candidate { pdg: -511, pt: 1.2, y: -0.3 },
///         Candidate { pdg: 521, pt: 1.5, y: 0.1 },
///         Candidate { pdg: 511, pt: 1.5, y: 0.7 },
///     ],
/// };
///
/// let hist = generator_cross_section(&[run], &[1.0], &[2.0], 511, 0.5).unwrap();
/// // 2 mb * 2 / 1000 * 1e3 / 2 / 1 GeV
/// assert_eq!(hist.contents, vec![2.0]);
/// ```
pub fn generator_cross_section(
    runs: &[GeneratorRun],
    pt_mins: &[f64],
    pt_maxs: &[f64],
    pdg: i32,
    y_max: f64,
) -> Result<Hist1D> {
    if pt_mins.len() != pt_maxs.len() || pt_mins.is_empty() {
        return Err(Error::PtBoundsMismatch {
            mins: pt_mins.len(),
            maxs: pt_maxs.len(),
        });
    }

    let n_accepted = runs.iter().map(|r| r.n_accepted).sum::<f64>();
    if n_accepted <= 0.0 {
        return Err(Error::NoAcceptedEvents);
    }
    let sigma_gen = runs.iter().map(|r| r.sigma_gen).sum::<f64>() / runs.len() as f64;

    let mut edges = pt_mins.to_vec();
    edges.push(pt_maxs[pt_maxs.len() - 1]);
    let mut hist = Hist1D::new("hCrossSection", edges)?
        .with_title(";p_{T} (GeV/c);d^{2}#sigma/dp_{T}dy (#mub (GeV/c)^{-1})");

    let candidates = runs
        .iter()
        .flat_map(|r| &r.candidates)
        .filter(|c| c.pdg.abs() == pdg.abs() && c.y.abs() < y_max)
        .collect::<Vec<&Candidate>>();

    for (&pt_min, &pt_max) in pt_mins.iter().zip(pt_maxs) {
        let n = candidates
            .iter()
            .filter(|c| pt_min <= c.pt && c.pt < pt_max)
            .count() as f64;

        // mb to µb, particle + antiparticle, per unit pT
        let norm = sigma_gen / n_accepted * 1e3 / 2.0 / (pt_max - pt_min);
        if let Some(bin) = hist.find_bin(0.5 * (pt_min + pt_max)) {
            hist.set(bin, n * norm, n.sqrt() * norm)?;
        }
    }

    Ok(hist)
}

/// Collect runs, compute the cross section and write `hCrossSection`
pub fn generator_cross_section_from_config(config: &GeneratorConfig) -> Result<Hist1D> {
    let runs = collect_runs(config)?;
    let hist = generator_cross_section(
        &runs,
        &config.pt.mins,
        &config.pt.maxs,
        config.pdg,
        config.y_max,
    )?;

    let mut store = Store::new();
    store.insert("hCrossSection", hist.clone());
    store.write(&config.output)?;
    info!("Generator cross section written to {}", config.output.display());
    Ok(hist)
}
