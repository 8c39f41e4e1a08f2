//! Raw-yield extraction in pT intervals

// standard library
use std::path::{Path, PathBuf};

// crate modules
use crate::config::{FitConfig, PtIntegratedFit, Selections};
use crate::error::Result;
use crate::fitter::MassFit;
use crate::minimise::MinimiserSettings;
use crate::model::{BackgroundShape, FitModel, Kde, SignalShape};

// external crates
use hfxs_hist::{Hist1D, Store};
use log::{debug, info, warn};
use serde::Deserialize;

/// Reconstructed candidate from a candidate table
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MassCandidate {
    /// Invariant mass
    #[serde(rename = "fM")]
    pub mass: f64,
    #[serde(rename = "fPt")]
    pub pt: f64,
    /// Classifier score
    #[serde(rename = "ML_output")]
    pub score: f64,
    /// Generator match flag, simulation only
    #[serde(rename = "fFlagMcMatchRec", default)]
    pub mc_flag: Option<i32>,
}

impl MassCandidate {
    /// Matched to a generated signal decay
    pub const SIGNAL: i32 = 1;
    /// Matched to a background source
    pub const BACKGROUND: i32 = 4;

    /// `pt_min < pt < pt_max`
    pub fn in_pt(&self, pt_min: f64, pt_max: f64) -> bool {
        pt_min < self.pt && self.pt < pt_max
    }

    /// `pt_min < pt < pt_max` and `score > cut`
    pub fn selected(&self, pt_min: f64, pt_max: f64, cut: f64) -> bool {
        self.in_pt(pt_min, pt_max) && self.score > cut
    }

    fn has_flag(&self, flag: i32) -> bool {
        self.mc_flag == Some(flag)
    }
}

/// Read and concatenate candidate tables
pub fn read_candidates<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<MassCandidate>> {
    let mut candidates = Vec::new();
    for path in paths {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;
        for record in reader.deserialize::<MassCandidate>() {
            candidates.push(record?);
        }
        info!("Read candidates from {}", path.as_ref().display());
    }
    Ok(candidates)
}

/// Every fit of an extraction and the summary store
#[derive(Debug, Clone)]
pub struct Extraction {
    /// `h_rawyields`, `h_significance`, `h_soverb`, `h_means`, `h_sigmas`,
    /// `h_means_mc`, `h_sigmas_mc` and the fitted mass histograms
    pub store: Store,
    pub fits: Vec<MassFit>,
}

/// Fit every pT interval of the configuration
///
/// Simulated signal candidates are fitted first with a double Gaussian to get
/// the expected peak position and width. Data are then fitted with the
/// configured shapes, optionally with a template from simulated background.
/// Intervals that fail to converge keep zero in the summary histograms.
pub fn extract_raw_yields(
    config: &FitConfig,
    data: &[MassCandidate],
    mc: &[MassCandidate],
) -> Result<Extraction> {
    config.validate()?;
    let settings = MinimiserSettings::default();
    let fit_config = &config.fit_configs;
    let edges = config.selections.pt_edges();

    let summary = |name: &str| Hist1D::new(name, edges.clone());
    let mut h_rawyields = summary("h_rawyields")?;
    let mut h_significance = summary("h_significance")?;
    let mut h_soverb = summary("h_soverb")?;
    let mut h_means = summary("h_means")?;
    let mut h_sigmas = summary("h_sigmas")?;
    let mut h_means_mc = summary("h_means_mc")?;
    let mut h_sigmas_mc = summary("h_sigmas_mc")?;

    let mut store = Store::new();
    let mut fits = Vec::new();

    // intervals only split the selected candidates in pT
    let data = select(&config.selections, data);
    let mc = select(&config.selections, mc);
    debug!("{} data and {} simulated candidates selected", data.len(), mc.len());

    if let Some(pt_int) = fit_config.pt_int.as_ref().filter(|p| p.activate) {
        let (mc_fit, data_fit) = fit_pt_integrated(config, pt_int, &data, &mc, &settings)?;
        fits.extend(mc_fit);
        if let Some(fit) = data_fit {
            if fit.converged() {
                store.insert("h_mass_ptint", fit.data.clone());
            }
            fits.push(fit);
        }
    }

    for (i, (pt_min, pt_max, _)) in config.selections.intervals().enumerate() {
        let label = format!("pt{pt_min:.0}_{pt_max:.0}");
        let limits = fit_config.mass_limits[i];
        let in_interval = |c: &&&MassCandidate| c.in_pt(pt_min, pt_max);

        // simulated signal peak
        let mc_masses = mc
            .iter()
            .filter(in_interval)
            .filter(|c| c.has_flag(MassCandidate::SIGNAL))
            .map(|c| c.mass);
        let mc_hist = mass_hist(
            &format!("h_mass_{label}_MC"),
            fit_config.nbins,
            limits,
            mc_masses,
        )?;
        if mc_hist.sum() > 0.0 {
            let model = FitModel::for_hist(&mc_hist, fit_config.particle_mass)
                .with_signal(SignalShape::DoubleGaus);
            let fit = MassFit::run(&format!("{label}_MC"), mc_hist, model, &settings)?;
            if fit.converged() {
                set_from(&mut h_means_mc, i, fit.mean())?;
                set_from(&mut h_sigmas_mc, i, fit.sigma())?;
            }
            fits.push(fit);
        } else {
            warn!("No simulated signal in {label}, skipping the MC fit");
        }

        // data
        let masses = data.iter().filter(in_interval).map(|c| c.mass);
        let hist = mass_hist(&format!("h_mass_{label}"), fit_config.nbins, limits, masses)?;
        if hist.sum() <= 0.0 {
            warn!("No data candidates in {label}, skipping the fit");
            continue;
        }

        let template = if fit_config.use_bkg_templ[i] {
            let masses = mc
                .iter()
                .filter(in_interval)
                .filter(|c| c.has_flag(MassCandidate::BACKGROUND))
                .map(|c| c.mass)
                .filter(|m| (limits[0]..=limits[1]).contains(m))
                .collect();
            background_template(masses, &label)
        } else {
            None
        };

        let model = data_model(
            &hist,
            fit_config.particle_mass,
            &fit_config.signal_funcs[i],
            &fit_config.bkg_funcs[i],
            template,
        )
        .with_sigma_limits(0.01, 0.8);
        let fit = MassFit::run(&label, hist, model, &settings)?;

        if fit.converged() {
            let (raw, raw_err) = fit.raw_yield();
            h_rawyields.set(i, raw, raw_err)?;
            let (value, error) = fit.significance();
            h_significance.set(i, value, error)?;
            let (value, error) = fit.signal_over_background();
            h_soverb.set(i, value, error)?;
            set_from(&mut h_means, i, fit.mean())?;
            set_from(&mut h_sigmas, i, fit.sigma())?;
            store.insert(&fit.data.name.clone(), fit.data.clone());
            info!("{label}: raw yield {raw:.1} +/- {raw_err:.1}");
        }
        fits.push(fit);
    }

    for hist in [
        h_rawyields,
        h_significance,
        h_soverb,
        h_means,
        h_sigmas,
        h_means_mc,
        h_sigmas_mc,
    ] {
        store.insert(&hist.name.clone(), hist);
    }

    Ok(Extraction { store, fits })
}

/// Read the candidate tables, run the extraction and write the store
pub fn extract_from_config(config: &FitConfig) -> Result<(PathBuf, Extraction)> {
    let data = read_candidates(&config.inputs.data)?;
    let mc = read_candidates(&config.inputs.mc)?;
    info!(
        "{} data and {} simulated candidates",
        data.len(),
        mc.len()
    );

    let extraction = extract_raw_yields(config, &data, &mc)?;
    let path = config.outputs.store_path();
    extraction.store.write(&path)?;
    info!("Raw yields written to {}", path.display());
    Ok((path, extraction))
}

fn fit_pt_integrated(
    config: &FitConfig,
    pt_int: &PtIntegratedFit,
    data: &[&MassCandidate],
    mc: &[&MassCandidate],
    settings: &MinimiserSettings,
) -> Result<(Option<MassFit>, Option<MassFit>)> {
    let fit_config = &config.fit_configs;
    let limits = pt_int.mass_limits;

    let mc_masses = mc
        .iter()
        .filter(|c| c.has_flag(MassCandidate::SIGNAL))
        .map(|c| c.mass);
    let mc_hist = mass_hist("h_mass_ptint_MC", fit_config.nbins, limits, mc_masses)?;
    let mc_fit = if mc_hist.sum() > 0.0 {
        let model = FitModel::for_hist(&mc_hist, fit_config.particle_mass)
            .with_signal(SignalShape::DoubleGaus);
        Some(MassFit::run("ptint_MC", mc_hist, model, settings)?)
    } else {
        warn!("No simulated signal for the pT-integrated fit");
        None
    };

    let masses = data.iter().map(|c| c.mass);
    let hist = mass_hist("h_mass_ptint", fit_config.nbins, limits, masses)?;
    if hist.sum() <= 0.0 {
        warn!("No data candidates for the pT-integrated fit");
        return Ok((mc_fit, None));
    }

    let template = if pt_int.use_bkg_templ {
        let masses = mc
            .iter()
            .filter(|c| c.has_flag(MassCandidate::BACKGROUND))
            .map(|c| c.mass)
            .filter(|m| (limits[0]..=limits[1]).contains(m))
            .collect();
        background_template(masses, "ptint")
    } else {
        None
    };

    let model = data_model(
        &hist,
        fit_config.particle_mass,
        &pt_int.signal_funcs,
        &pt_int.bkg_funcs,
        template,
    )
    .with_sigma_limits(0.01, 0.08);
    let data_fit = MassFit::run("ptint", hist, model, settings)?;
    Ok((mc_fit, Some(data_fit)))
}

fn data_model(
    hist: &Hist1D,
    mass: f64,
    signals: &[SignalShape],
    backgrounds: &[BackgroundShape],
    template: Option<Kde>,
) -> FitModel {
    let mut model = FitModel::for_hist(hist, mass);
    for shape in signals {
        model = model.with_signal(*shape);
    }
    for shape in backgrounds {
        model = model.with_background(*shape);
    }
    if let Some(kde) = template {
        model = model.with_template(kde);
    }
    model
}

fn background_template(masses: Vec<f64>, label: &str) -> Option<Kde> {
    match Kde::new(masses) {
        Ok(kde) => Some(kde),
        Err(e) => {
            warn!("No background template for {label}: {e}");
            None
        }
    }
}

fn mass_hist<I: Iterator<Item = f64>>(
    name: &str,
    nbins: usize,
    limits: [f64; 2],
    masses: I,
) -> Result<Hist1D> {
    let mut hist = Hist1D::uniform(name, nbins, limits[0], limits[1])?;
    for mass in masses {
        hist.fill(mass, 1.0);
    }
    Ok(hist)
}

/// Candidates passing the cut of any interval
fn select<'a>(selections: &Selections, candidates: &'a [MassCandidate]) -> Vec<&'a MassCandidate> {
    candidates
        .iter()
        .filter(|c| {
            selections
                .intervals()
                .any(|(lo, hi, cut)| c.selected(lo, hi, cut))
        })
        .collect()
}

fn set_from(hist: &mut Hist1D, bin: usize, value: Option<(f64, f64)>) -> Result<()> {
    if let Some((value, error)) = value {
        hist.set(bin, value, error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_selection() {
        let c = MassCandidate {
            mass: 5.28,
            pt: 4.0,
            score: 0.7,
            mc_flag: None,
        };
        assert!(c.selected(2.0, 6.0, 0.5));
        assert!(!c.selected(4.0, 6.0, 0.5));
        assert!(!c.selected(2.0, 4.0, 0.5));
        assert!(!c.selected(2.0, 6.0, 0.7));
    }

    #[test]
    fn overlapping_intervals_share_selected_candidates() {
        let selections = Selections {
            pt_mins: vec![2.0, 4.0],
            pt_maxs: vec![6.0, 8.0],
            bdt_sel: vec![0.9, 0.1],
        };
        let candidate = |pt: f64, score: f64| MassCandidate {
            mass: 5.28,
            pt,
            score,
            mc_flag: Some(MassCandidate::SIGNAL),
        };
        let candidates = [candidate(5.0, 0.5), candidate(3.0, 0.5), candidate(3.0, 0.95)];

        let selected = select(&selections, &candidates);
        assert_eq!(selected.len(), 2);

        // the first interval counts the 5 GeV/c candidate kept by the looser cut
        let first: Vec<f64> = selected
            .iter()
            .filter(|c| c.in_pt(2.0, 6.0))
            .map(|c| c.pt)
            .collect();
        assert_eq!(first, vec![5.0, 3.0]);
    }

    #[test]
    fn mass_hist_drops_overflow() {
        let hist = mass_hist("h", 4, [5.0, 5.4], [4.9, 5.05, 5.15, 5.15, 5.5].into_iter()).unwrap();
        assert_eq!(hist.contents, vec![1.0, 2.0, 0.0, 0.0]);
    }
}
