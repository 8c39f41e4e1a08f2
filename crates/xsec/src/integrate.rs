//! Visible and extrapolated cross sections from a differential measurement

// crate modules
use crate::config::IntegrateConfig;
use crate::error::{Error, Result};

// external crates
use hfxs_hist::{Graph, Hist1D, Point, Store};
use hfxs_utils::{SliceExt, ValueExt};
use log::{debug, info};

/// Everything needed to compute an integrated cross section
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSectionInputs {
    /// Differential cross section with statistical errors
    pub h_stat: Hist1D,
    /// Systematic sources fully correlated across pT bins
    pub correlated: Vec<Hist1D>,
    /// Systematic sources independent between pT bins
    pub uncorrelated: Vec<Hist1D>,
    /// Theory graph, the first point holds the extrapolation factor
    pub extrapolation: Graph,
}

impl CrossSectionInputs {
    /// Load every input named in the configuration
    ///
    /// Systematic histograms are looked up by their source name.
    pub fn from_config(config: &IntegrateConfig) -> Result<Self> {
        let store = Store::read(&config.inputs.cross_section)?;
        let h_stat = store.get_hist(&config.inputs.stat_object)?.clone();

        let load = |names: &[String]| -> Result<Vec<Hist1D>> {
            names
                .iter()
                .map(|name| {
                    let mut hist = store.get_hist(name)?.clone();
                    hist.name = name.clone();
                    Ok(hist)
                })
                .collect()
        };
        let correlated = load(&config.systematics.correlated)?;
        let uncorrelated = load(&config.systematics.uncorrelated)?;

        let theory = Store::read(&config.inputs.extrapolation)?;
        let extrapolation = theory.get_graph(&config.inputs.extrapolation_object)?;

        Ok(Self {
            h_stat,
            correlated,
            uncorrelated,
            extrapolation,
        })
    }
}

/// Uncertainty from a single systematic source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUncertainty {
    pub name: String,
    /// Absolute uncertainty on the visible cross section
    pub absolute: f64,
    /// Relative to the visible cross section
    pub relative: f64,
}

/// Extrapolation factor with asymmetric errors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrapolationFactor {
    pub value: f64,
    pub low: f64,
    pub high: f64,
}

/// Result of [integrate()]
///
/// All absolute uncertainties are for the visible cross section, the
/// integrated equivalents are scaled by the central extrapolation factor.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratedCrossSection {
    /// Lowest and highest pT edges of the measurement
    pub pt_range: (f64, f64),
    pub visible: f64,
    pub stat: f64,
    pub correlated: Vec<SourceUncertainty>,
    pub uncorrelated: Vec<SourceUncertainty>,
    /// Quadrature sum of the correlated sources
    pub correlated_total: f64,
    /// Quadrature sum of the uncorrelated sources
    pub uncorrelated_total: f64,
    /// Total systematic uncertainty
    pub syst: f64,
    pub factor: ExtrapolationFactor,
    /// Theory graph the factor was taken from
    pub factor_graph: Graph,
}

/// Integrate a differential cross section and extrapolate it
///
/// Each systematic histogram holds the absolute uncertainty per bin as its
/// content. Correlated sources add linearly across bins, uncorrelated ones
/// in quadrature. Sources are then combined in quadrature.
///
/// ```rust
/// # use hfxs_hist::{Graph, Hist1D, Point};
/// # use hfxs_xsec::{integrate, CrossSectionInputs};
/// let edges = vec![0.0, 1.0, 3.0];
/// let h_stat = Hist1D::with_values("h_stat", edges.clone(), vec![4.0, 1.0], vec![0.0; 2]);
/// let lumi = Hist1D::with_values("lumi", edges, vec![0.5, 0.5], vec![0.0; 2]);
/// let inputs = CrossSectionInputs {
///     h_stat: h_stat.unwrap(),
///     correlated: vec![lumi.unwrap()],
///     uncorrelated: vec![],
///     extrapolation: Graph::new("g_extrap", vec![Point::new(0.5, 2.0)]).unwrap(),
/// };
///
/// let result = integrate(&inputs).unwrap();
/// assert_eq!(result.visible, 6.0);
/// assert_eq!(result.syst, 1.5);
/// assert_eq!(result.integrated(), 12.0);
/// ```
pub fn integrate(inputs: &CrossSectionInputs) -> Result<IntegratedCrossSection> {
    let h_stat = &inputs.h_stat;
    let widths = h_stat.bin_widths();

    // bin-wise values multiplied by the bin width
    let weighted = |values: &[f64]| -> Vec<f64> {
        values.iter().zip(&widths).map(|(v, w)| v * w).collect()
    };

    let visible = weighted(&h_stat.contents).iter().sum::<f64>();
    let stat = weighted(&h_stat.errors).quadrature();
    if visible == 0.0 {
        return Err(Error::VanishingCrossSection);
    }
    debug!("Visible cross section {}", visible.pm(stat, 4));

    let source = |hist: &Hist1D, combine: fn(&[f64]) -> f64| -> Result<SourceUncertainty> {
        if !hist.same_binning(h_stat) {
            return Err(Error::BinningMismatch {
                name: hist.name.clone(),
                reference: h_stat.name.clone(),
            });
        }
        let absolute = combine(&weighted(&hist.contents));
        debug!("  {:<20} {}", hist.name, absolute.sci(4, 2));
        Ok(SourceUncertainty {
            name: hist.name.clone(),
            absolute,
            relative: absolute / visible,
        })
    };

    let correlated = inputs
        .correlated
        .iter()
        .map(|h| source(h, <[f64] as SliceExt>::linear_abs_sum))
        .collect::<Result<Vec<_>>>()?;
    let uncorrelated = inputs
        .uncorrelated
        .iter()
        .map(|h| source(h, <[f64] as SliceExt>::quadrature))
        .collect::<Result<Vec<_>>>()?;

    let total = |sources: &[SourceUncertainty]| -> f64 {
        sources.iter().map(|s| s.absolute).collect::<Vec<f64>>().quadrature()
    };
    let correlated_total = total(&correlated);
    let uncorrelated_total = total(&uncorrelated);
    let syst = correlated_total.hypot(uncorrelated_total);

    let Some(first) = inputs.extrapolation.points.first() else {
        return Err(Error::EmptyExtrapolation {
            name: inputs.extrapolation.name.clone(),
        });
    };
    let factor = ExtrapolationFactor {
        value: first.y,
        low: first.eyl,
        high: first.eyh,
    };

    Ok(IntegratedCrossSection {
        pt_range: (h_stat.lo(), h_stat.hi()),
        visible,
        stat,
        correlated,
        uncorrelated,
        correlated_total,
        uncorrelated_total,
        syst,
        factor,
        factor_graph: inputs.extrapolation.clone(),
    })
}

impl IntegratedCrossSection {
    /// Visible cross section extrapolated to the full range
    pub fn integrated(&self) -> f64 {
        self.visible * self.factor.value
    }

    /// Statistical uncertainty on the integrated cross section
    pub fn integrated_stat(&self) -> f64 {
        self.stat * self.factor.value
    }

    /// Systematic uncertainty on the integrated cross section
    pub fn integrated_syst(&self) -> f64 {
        self.syst * self.factor.value
    }

    /// Absolute extrapolation uncertainty below and above
    ///
    /// The factor errors are relative, so they scale the integrated value.
    pub fn extrapolation_errors(&self) -> (f64, f64) {
        let integrated = self.integrated();
        (integrated * self.factor.low, integrated * self.factor.high)
    }

    /// Lower and upper integrated cross section from the factor uncertainty
    pub fn extrapolation_bounds(&self) -> (f64, f64) {
        let (low, high) = self.extrapolation_errors();
        (self.integrated() - low, self.integrated() + high)
    }

    /// Every source, correlated first
    pub fn sources(&self) -> impl Iterator<Item = &SourceUncertainty> {
        self.correlated.iter().chain(&self.uncorrelated)
    }

    /// Single-bin histograms and graphs in `visible/` and `integrated/`
    pub fn to_store(&self) -> Result<Store> {
        let mut store = Store::new();
        let (lo, hi) = self.pt_range;

        // visible cross section spans the measured pT range
        let single = |name: &str, lo: f64, hi: f64, content: f64, error: f64| {
            Hist1D::with_values(name, vec![lo, hi], vec![content], vec![error])
        };
        let f = self.factor.value;

        for (dir, lo, hi, scale) in [("visible", lo, hi, 1.0), ("integrated", 0.0, 1.0, f)] {
            let suffix = if dir == "visible" { "vis" } else { "int" };
            let key = |name: &str| format!("{dir}/{name}");

            let names = [
                (format!("h_stat_{suffix}"), self.visible, self.stat),
                (format!("h_syst_{suffix}_tot"), self.visible, self.syst),
                (format!("correlated_{suffix}"), self.correlated_total, 0.0),
                (format!("uncorrelated_{suffix}"), self.uncorrelated_total, 0.0),
            ];
            for (name, content, error) in names {
                store.insert(&key(&name), single(&name, lo, hi, content * scale, error * scale)?);
            }

            for source in self.sources() {
                let rel = format!("{}_rel", source.name);
                store.insert(
                    &key(&source.name),
                    single(&source.name, lo, hi, source.absolute * scale, 0.0)?,
                );
                store.insert(&key(&rel), single(&rel, lo, hi, source.relative, 0.0)?);
            }
        }

        let (low, high) = self.extrapolation_errors();
        let g_extrap = Graph::new(
            "g_extrap",
            vec![Point {
                x: 0.5,
                y: self.integrated(),
                exl: 0.5,
                exh: 0.5,
                eyl: low,
                eyh: high,
            }],
        )?;
        let mut g_extrap_rel = g_extrap.relative_band();
        g_extrap_rel.name = "g_extrap_rel".to_string();
        let mut g_extrap_factor = self.factor_graph.clone();
        g_extrap_factor.name = "g_extrap_factor".to_string();

        store.insert("integrated/g_extrap", g_extrap);
        store.insert("integrated/g_extrap_rel", g_extrap_rel);
        store.insert("integrated/g_extrap_factor", g_extrap_factor);
        Ok(store)
    }
}

impl std::fmt::Display for IntegratedCrossSection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (lo, hi) = self.pt_range;
        writeln!(f, "Visible cross section ({lo} < pT < {hi})")?;
        writeln!(f, "  value       {}", self.visible.sci(4, 2))?;
        writeln!(f, "  stat        {}", self.stat.sci(4, 2))?;
        writeln!(f, "  syst        {}", self.syst.sci(4, 2))?;
        for s in self.sources() {
            writeln!(f, "    {:<10}{} ({:.2}%)", s.name, s.absolute.sci(4, 2), 100.0 * s.relative)?;
        }

        let (low, high) = self.extrapolation_errors();
        writeln!(f, "Integrated cross section")?;
        writeln!(
            f,
            "  factor      {:.4} -{:.4} +{:.4}",
            self.factor.value, self.factor.low, self.factor.high
        )?;
        writeln!(f, "  value       {}", self.integrated().sci(4, 2))?;
        writeln!(f, "  stat        {}", self.integrated_stat().sci(4, 2))?;
        writeln!(f, "  syst        {}", self.integrated_syst().sci(4, 2))?;
        write!(f, "  extrap      -{} +{}", low.sci(4, 2), high.sci(4, 2))
    }
}

/// Load, integrate and write the output store named in the configuration
pub fn integrate_from_config(config: &IntegrateConfig) -> Result<IntegratedCrossSection> {
    let inputs = CrossSectionInputs::from_config(config)?;
    let result = integrate(&inputs)?;

    let path = config.output.path();
    result.to_store()?.write(&path)?;
    info!("Integrated cross section written to {}", path.display());
    Ok(result)
}
