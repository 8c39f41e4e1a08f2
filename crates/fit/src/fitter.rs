//! Binned maximum-likelihood fits of invariant-mass histograms

// standard library
use std::fmt;

// crate modules
use crate::error::Result;
use crate::minimise::{minimise, propagate, Minimum, MinimiserSettings, Parameter};
use crate::model::{BinnedNll, FitModel, Part};

// external crates
use hfxs_hist::Hist1D;
use hfxs_utils::ValueExt;
use log::{debug, warn};

/// Half-width of the signal window in units of the peak width
const WINDOW_SIGMAS: f64 = 3.0;

/// Result of fitting a model to a mass histogram
#[derive(Debug, Clone, PartialEq)]
pub struct MassFit {
    /// Label used for figure and object names, e.g. `pt2_4` or `ptint_MC`
    pub name: String,
    pub data: Hist1D,
    pub model: FitModel,
    pub parameters: Vec<Parameter>,
    pub minimum: Minimum,
}

impl MassFit {
    /// Fit `model` to the counts in `data`
    pub fn run(
        name: &str,
        data: Hist1D,
        model: FitModel,
        settings: &MinimiserSettings,
    ) -> Result<Self> {
        let parameters = model.parameters(&data)?;
        let minimum = {
            let nll = BinnedNll::new(&model, &data.contents);
            minimise(&nll, &parameters, settings)?
        };

        if minimum.converged {
            debug!("Fit '{name}' converged:\n{}", table(&parameters, &minimum));
        } else {
            warn!("Fit '{name}' did not converge");
        }

        Ok(Self {
            name: name.to_string(),
            data,
            model,
            parameters,
            minimum,
        })
    }

    pub fn converged(&self) -> bool {
        self.minimum.converged
    }

    /// Value and error of a named parameter, e.g. `mu_0`
    pub fn parameter(&self, name: &str) -> Option<(f64, f64)> {
        let index = self.parameters.iter().position(|p| p.name == name)?;
        Some((self.minimum.params[index], self.minimum.errors[index]))
    }

    /// Mean of the first signal peak
    pub fn mean(&self) -> Option<(f64, f64)> {
        self.parameter("mu_0")
    }

    /// Width of the first signal peak, the core width for a double Gaussian
    pub fn sigma(&self) -> Option<(f64, f64)> {
        self.parameter("sigma_0").or_else(|| self.parameter("sigma1_0"))
    }

    /// Total signal yield
    pub fn raw_yield(&self) -> (f64, f64) {
        let f = |p: &[f64]| self.model.total_yield(p, Part::Signal);
        (f(&self.minimum.params), propagate(f, &self.minimum))
    }

    /// Signal and background expected within three widths of the peak
    pub fn window_yields(&self) -> (f64, f64) {
        window(&self.model, &self.minimum.params)
    }

    /// `S / sqrt(S + B)` within three widths of the peak
    pub fn significance(&self) -> (f64, f64) {
        let f = |p: &[f64]| {
            let (s, b) = window(&self.model, p);
            if s + b > 0.0 {
                s / (s + b).sqrt()
            } else {
                0.0
            }
        };
        (f(&self.minimum.params), propagate(f, &self.minimum))
    }

    /// `S / B` within three widths of the peak, zero without background
    pub fn signal_over_background(&self) -> (f64, f64) {
        let f = |p: &[f64]| {
            let (s, b) = window(&self.model, p);
            if b > 0.0 {
                s / b
            } else {
                0.0
            }
        };
        (f(&self.minimum.params), propagate(f, &self.minimum))
    }

    /// Expected counts per bin at the minimum
    pub fn expected(&self, part: Part) -> Vec<f64> {
        self.model.expected_part(&self.minimum.params, part)
    }

    /// Data with the fitted background subtracted
    pub fn residuals(&self) -> Hist1D {
        let mut residuals = self.data.clone();
        residuals.name = format!("{}_residuals", self.data.name);
        for (content, background) in residuals
            .contents
            .iter_mut()
            .zip(self.expected(Part::Background))
        {
            *content -= background;
        }
        residuals
    }

    /// Smooth prediction in counts per bin at `n` points across the range
    pub fn curve(&self, n: usize, part: Part) -> Vec<(f64, f64)> {
        let (lo, hi) = self.model.range();
        let width = (hi - lo) / self.data.nbins().max(1) as f64;
        let step = (hi - lo) / n.saturating_sub(1).max(1) as f64;
        (0..n)
            .map(|i| {
                let x = lo + i as f64 * step;
                (x, width * self.model.density(&self.minimum.params, x, part))
            })
            .collect()
    }

    /// Pearson chi-square over filled bins, and degrees of freedom
    pub fn chi2(&self) -> (f64, usize) {
        let expected = self.expected(Part::Total);
        let mut chi2 = 0.0;
        let mut filled: usize = 0;
        for (n, mu) in self.data.contents.iter().zip(&expected) {
            if *n > 0.0 && *mu > 0.0 {
                chi2 += (n - mu).powi(2) / mu;
                filled += 1;
            }
        }
        (chi2, filled.saturating_sub(self.parameters.len()))
    }
}

impl fmt::Display for MassFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (chi2, ndf) = self.chi2();
        writeln!(f, "Mass fit '{}'", self.name)?;
        writeln!(f, "  converged: {}", self.converged())?;
        writeln!(f, "  chi2/ndf : {chi2:.2}/{ndf}")?;
        write!(f, "{}", table(&self.parameters, &self.minimum))
    }
}

fn window(model: &FitModel, params: &[f64]) -> (f64, f64) {
    let Some((mean, sigma)) = model.peak(params) else {
        return (0.0, 0.0);
    };
    let (a, b) = (mean - WINDOW_SIGMAS * sigma, mean + WINDOW_SIGMAS * sigma);
    (
        model.window_yield(params, a, b, Part::Signal),
        model.window_yield(params, a, b, Part::Background),
    )
}

fn table(parameters: &[Parameter], minimum: &Minimum) -> String {
    parameters
        .iter()
        .zip(minimum.params.iter().zip(&minimum.errors))
        .map(|(p, (v, e))| format!("  {:<9}: {}\n", p.name, v.pm(*e, 4)))
        .collect()
}
