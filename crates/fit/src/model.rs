//! Signal and background shapes of the invariant-mass fit
//!
//! Every shape is a probability density normalised over the fit range and
//! scaled by its own yield, so the model predicts counts per bin directly.

// standard library
use std::f64::consts::{PI, SQRT_2};

// crate modules
use crate::error::{Error, Result};
use crate::minimise::{Objective, Parameter};

// external crates
use hfxs_hist::Hist1D;
use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;

/// Signal peak shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalShape {
    /// Parameters `mu`, `sigma`
    Gaussian,
    /// Two Gaussians with a common mean, `mu`, `sigma1`, `sigma2`, `frac`
    DoubleGaus,
}

/// Combinatorial background shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundShape {
    /// Exponential with parameter `slope`
    Expo,
    /// `1 + c1 t` for `t` running from 0 to 1 across the range
    Pol1,
    /// `1 + c1 t + c2 t^2`
    Pol2,
    /// No background component at all
    NoBkg,
}

impl SignalShape {
    fn shape_names(&self) -> &'static [&'static str] {
        match self {
            Self::Gaussian => &["mu", "sigma"],
            Self::DoubleGaus => &["mu", "sigma1", "sigma2", "frac"],
        }
    }
}

impl BackgroundShape {
    fn shape_names(&self) -> &'static [&'static str] {
        match self {
            Self::Expo => &["slope"],
            Self::Pol1 => &["c1"],
            Self::Pol2 => &["c1", "c2"],
            Self::NoBkg => &[],
        }
    }
}

/// Gaussian kernel density estimate of a background template
///
/// The bandwidth follows Silverman's rule of thumb.
///
/// ```rust
/// # use hfxs_fit::Kde;
/// let kde = Kde::new(vec![5.0, 5.1, 5.2, 5.3, 5.4]).unwrap();
///
/// // the whole real line holds every kernel
/// assert!((kde.integral(0.0, 10.0) - 1.0).abs() < 1e-12);
/// assert!(kde.density(5.2) > kde.density(5.5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Kde {
    points: Vec<f64>,
    bandwidth: f64,
}

impl Kde {
    /// Build the estimate from sample values
    pub fn new(points: Vec<f64>) -> Result<Self> {
        let n = points.len() as f64;
        if points.len() < 2 {
            return Err(Error::TemplateTooSmall {
                found: points.len(),
            });
        }

        let mean = points.iter().sum::<f64>() / n;
        let variance = points.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        if variance <= 0.0 {
            return Err(Error::TemplateTooSmall { found: 1 });
        }

        let bandwidth = 1.06 * variance.sqrt() * n.powf(-0.2);
        Ok(Self { points, bandwidth })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Probability density at `x`
    pub fn density(&self, x: f64) -> f64 {
        let sum = self
            .points
            .iter()
            .map(|p| gauss_pdf(x, *p, self.bandwidth))
            .sum::<f64>();
        sum / self.points.len() as f64
    }

    /// Probability between `a` and `b`
    pub fn integral(&self, a: f64, b: f64) -> f64 {
        let sum = self
            .points
            .iter()
            .map(|p| gauss_cdf(b, *p, self.bandwidth) - gauss_cdf(a, *p, self.bandwidth))
            .sum::<f64>();
        sum / self.points.len() as f64
    }
}

/// Which components to include in a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Total,
    Signal,
    Background,
}

#[derive(Debug, Clone, PartialEq)]
enum Component {
    Signal(SignalShape),
    Background(BackgroundShape),
    Template(Kde),
}

impl Component {
    fn shape_names(&self) -> &'static [&'static str] {
        match self {
            Self::Signal(s) => s.shape_names(),
            Self::Background(b) => b.shape_names(),
            Self::Template(_) => &[],
        }
    }

    fn in_part(&self, part: Part) -> bool {
        match part {
            Part::Total => true,
            Part::Signal => matches!(self, Self::Signal(_)),
            Part::Background => !matches!(self, Self::Signal(_)),
        }
    }

    /// Fraction of the component between `a` and `b` within `range`
    fn integral(&self, shape: &[f64], a: f64, b: f64, range: (f64, f64)) -> f64 {
        let (lo, hi) = range;
        let (a, b) = (a.max(lo), b.min(hi));
        if b <= a {
            return 0.0;
        }

        match self {
            Self::Signal(SignalShape::Gaussian) => truncated_gauss(a, b, shape[0], shape[1], range),
            Self::Signal(SignalShape::DoubleGaus) => {
                let frac = shape[3];
                frac * truncated_gauss(a, b, shape[0], shape[1], range)
                    + (1.0 - frac) * truncated_gauss(a, b, shape[0], shape[2], range)
            }
            Self::Background(BackgroundShape::Expo) => {
                let k = shape[0] * (hi - lo);
                let (ta, tb) = ((a - lo) / (hi - lo), (b - lo) / (hi - lo));
                if k.abs() < 1e-8 {
                    tb - ta
                } else {
                    (k * ta).exp() * (k * (tb - ta)).exp_m1() / k.exp_m1()
                }
            }
            Self::Background(_) => {
                let c = poly_coefficients(shape);
                let norm = poly_primitive(&c, 1.0);
                if norm <= 0.0 {
                    return 0.0;
                }
                let (ta, tb) = ((a - lo) / (hi - lo), (b - lo) / (hi - lo));
                ((poly_primitive(&c, tb) - poly_primitive(&c, ta)) / norm).max(0.0)
            }
            Self::Template(kde) => {
                let norm = kde.integral(lo, hi);
                if norm <= 0.0 {
                    return 0.0;
                }
                kde.integral(a, b) / norm
            }
        }
    }

    /// Density of the component at `x` within `range`
    fn density(&self, shape: &[f64], x: f64, range: (f64, f64)) -> f64 {
        let (lo, hi) = range;
        if !(lo..=hi).contains(&x) {
            return 0.0;
        }

        let truncated = |mu: f64, sigma: f64| {
            let norm = gauss_cdf(hi, mu, sigma) - gauss_cdf(lo, mu, sigma);
            if sigma > 0.0 && norm > 0.0 {
                gauss_pdf(x, mu, sigma) / norm
            } else {
                0.0
            }
        };

        let t = (x - lo) / (hi - lo);
        match self {
            Self::Signal(SignalShape::Gaussian) => truncated(shape[0], shape[1]),
            Self::Signal(SignalShape::DoubleGaus) => {
                shape[3] * truncated(shape[0], shape[1])
                    + (1.0 - shape[3]) * truncated(shape[0], shape[2])
            }
            Self::Background(BackgroundShape::Expo) => {
                let k = shape[0] * (hi - lo);
                if k.abs() < 1e-8 {
                    1.0 / (hi - lo)
                } else {
                    k * (k * t).exp() / k.exp_m1() / (hi - lo)
                }
            }
            Self::Background(_) => {
                let c = poly_coefficients(shape);
                let norm = poly_primitive(&c, 1.0);
                if norm <= 0.0 {
                    return 0.0;
                }
                let value = c.iter().rev().fold(0.0, |acc, c| acc * t + c);
                value.max(0.0) / norm / (hi - lo)
            }
            Self::Template(kde) => {
                let norm = kde.integral(lo, hi);
                if norm <= 0.0 {
                    return 0.0;
                }
                kde.density(x) / norm
            }
        }
    }
}

/// Extended mass model, a sum of yield-scaled shapes over fixed bins
///
/// Parameters are laid out component by component, each as its yield
/// followed by its shape parameters.
///
/// ```rust
/// # use hfxs_fit::{BackgroundShape, FitModel, SignalShape};
/// # use hfxs_hist::Hist1D;
/// let hist = Hist1D::uniform("h_mass", 56, 4.9, 5.66).unwrap();
/// let model = FitModel::for_hist(&hist, 5.28)
///     .with_signal(SignalShape::Gaussian)
///     .with_background(BackgroundShape::Expo);
///
/// assert_eq!(model.parameter_names(), vec!["n_sig_0", "mu_0", "sigma_0", "n_bkg_0", "slope_0"]);
///
/// let expected = model.expected(&[100.0, 5.28, 0.03, 400.0, -1.0]);
/// assert!((expected.iter().sum::<f64>() - 500.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FitModel {
    edges: Vec<f64>,
    mass: f64,
    sigma_limits: (f64, f64),
    components: Vec<Component>,
}

impl FitModel {
    /// An empty model binned like `hist`, peaking near `mass`
    pub fn for_hist(hist: &Hist1D, mass: f64) -> Self {
        Self {
            edges: hist.edges.clone(),
            mass,
            sigma_limits: (0.01, 0.8),
            components: Vec::new(),
        }
    }

    pub fn with_signal(mut self, shape: SignalShape) -> Self {
        self.components.push(Component::Signal(shape));
        self
    }

    /// Add a background shape, `nobkg` adds nothing
    pub fn with_background(mut self, shape: BackgroundShape) -> Self {
        if shape != BackgroundShape::NoBkg {
            self.components.push(Component::Background(shape));
        }
        self
    }

    /// Add a fixed background template with a free yield
    pub fn with_template(mut self, kde: Kde) -> Self {
        self.components.push(Component::Template(kde));
        self
    }

    /// Limits on the width of single Gaussian peaks
    pub fn with_sigma_limits(mut self, lower: f64, upper: f64) -> Self {
        self.sigma_limits = (lower, upper);
        self
    }

    /// Lower and upper edge of the fit range
    pub fn range(&self) -> (f64, f64) {
        let lo = self.edges.first().copied().unwrap_or_default();
        let hi = self.edges.last().copied().unwrap_or_default();
        (lo, hi)
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// True if any component is not signal
    pub fn has_background(&self) -> bool {
        self.components.iter().any(|c| c.in_part(Part::Background))
    }

    /// Names of every parameter in order
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let (mut n_sig, mut n_bkg) = (0, 0);
        for component in &self.components {
            let index = match component {
                Component::Signal(_) => {
                    names.push(format!("n_sig_{n_sig}"));
                    n_sig += 1;
                    n_sig - 1
                }
                Component::Background(_) => {
                    names.push(format!("n_bkg_{n_bkg}"));
                    n_bkg += 1;
                    n_bkg - 1
                }
                Component::Template(_) => {
                    names.push("n_templ".to_string());
                    continue;
                }
            };
            for shape in component.shape_names() {
                names.push(format!("{shape}_{index}"));
            }
        }
        names
    }

    /// Index of a named parameter
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameter_names().iter().position(|n| n == name)
    }

    /// Starting values and limits for a fit to `data`
    pub fn parameters(&self, data: &Hist1D) -> Result<Vec<Parameter>> {
        if !self.components.iter().any(|c| c.in_part(Part::Signal)) {
            return Err(Error::EmptyModel);
        }

        let (lo, hi) = self.range();
        let total = data.sum().max(1.0);
        let max_yield = 2.0 * total + 10.0;
        let n_signal = self.count(Part::Signal) as f64;
        let n_background = self.count(Part::Background) as f64;
        let (sig_init, bkg_init) = if self.has_background() {
            (0.05 * total / n_signal, 0.8 * total / n_background)
        } else {
            (total / n_signal, 0.0)
        };

        let names = self.parameter_names();
        let mut parameters = Vec::with_capacity(names.len());
        let mut name = names.iter();
        let mut push = |init: f64, lower: f64, upper: f64| {
            let n = name.next().map(|s| s.as_str()).unwrap_or_default();
            parameters.push(Parameter::new(n, init.clamp(lower, upper), lower, upper));
        };

        let (sigma_lo, sigma_hi) = self.sigma_limits;
        for component in &self.components {
            match component {
                Component::Signal(shape) => {
                    push(sig_init, 0.0, max_yield);
                    push(self.mass, lo, hi);
                    match shape {
                        SignalShape::Gaussian => push(0.03, sigma_lo, sigma_hi),
                        SignalShape::DoubleGaus => {
                            push(0.03, 0.01, 0.08);
                            push(0.08, 0.01, 0.25);
                            push(0.5, 0.0, 1.0);
                        }
                    }
                }
                Component::Background(shape) => {
                    push(bkg_init, 0.0, max_yield);
                    match shape {
                        BackgroundShape::Expo => push(-1.0, -100.0, 100.0),
                        BackgroundShape::Pol1 => push(0.0, -1.0, 10.0),
                        BackgroundShape::Pol2 => {
                            push(0.0, -1.0, 10.0);
                            push(0.0, -1.0, 10.0);
                        }
                        BackgroundShape::NoBkg => {}
                    }
                }
                Component::Template(_) => push(bkg_init, 0.0, max_yield),
            }
        }
        Ok(parameters)
    }

    /// Expected counts in every bin
    pub fn expected(&self, params: &[f64]) -> Vec<f64> {
        self.expected_part(params, Part::Total)
    }

    /// Expected counts in every bin from part of the model
    pub fn expected_part(&self, params: &[f64], part: Part) -> Vec<f64> {
        let range = self.range();
        let mut expected = vec![0.0; self.edges.len().saturating_sub(1)];
        for (component, offset) in self.components.iter().zip(self.offsets()) {
            if !component.in_part(part) {
                continue;
            }
            let n = params[offset];
            let shape = &params[offset + 1..offset + 1 + component.shape_names().len()];
            for (value, bin) in expected.iter_mut().zip(self.edges.windows(2)) {
                *value += n * component.integral(shape, bin[0], bin[1], range);
            }
        }
        expected
    }

    /// Expected counts between `a` and `b` from part of the model
    pub fn window_yield(&self, params: &[f64], a: f64, b: f64, part: Part) -> f64 {
        let range = self.range();
        self.components
            .iter()
            .zip(self.offsets())
            .filter(|(c, _)| c.in_part(part))
            .map(|(c, offset)| {
                let shape = &params[offset + 1..offset + 1 + c.shape_names().len()];
                params[offset] * c.integral(shape, a, b, range)
            })
            .sum()
    }

    /// Expected counts per unit mass at `x`
    pub fn density(&self, params: &[f64], x: f64, part: Part) -> f64 {
        let range = self.range();
        self.components
            .iter()
            .zip(self.offsets())
            .filter(|(c, _)| c.in_part(part))
            .map(|(c, offset)| {
                let shape = &params[offset + 1..offset + 1 + c.shape_names().len()];
                params[offset] * c.density(shape, x, range)
            })
            .sum()
    }

    /// Sum of the yields of part of the model
    pub fn total_yield(&self, params: &[f64], part: Part) -> f64 {
        self.components
            .iter()
            .zip(self.offsets())
            .filter(|(c, _)| c.in_part(part))
            .map(|(_, offset)| params[offset])
            .sum()
    }

    /// Mean and core width of the first signal peak
    pub fn peak(&self, params: &[f64]) -> Option<(f64, f64)> {
        self.components
            .iter()
            .zip(self.offsets())
            .find(|(c, _)| c.in_part(Part::Signal))
            .map(|(_, offset)| (params[offset + 1], params[offset + 2]))
    }

    fn count(&self, part: Part) -> usize {
        self.components.iter().filter(|c| c.in_part(part)).count()
    }

    /// Index of the yield of every component
    fn offsets(&self) -> Vec<usize> {
        let mut offset = 0;
        self.components
            .iter()
            .map(|c| {
                let start = offset;
                offset += 1 + c.shape_names().len();
                start
            })
            .collect()
    }
}

/// Extended binned Poisson likelihood, as a deviance from the saturated model
#[derive(Debug)]
pub struct BinnedNll<'a> {
    model: &'a FitModel,
    counts: &'a [f64],
}

impl<'a> BinnedNll<'a> {
    pub fn new(model: &'a FitModel, counts: &'a [f64]) -> Self {
        Self { model, counts }
    }
}

impl Objective for BinnedNll<'_> {
    fn value(&self, params: &[f64]) -> f64 {
        self.model
            .expected(params)
            .iter()
            .zip(self.counts)
            .map(|(mu, n)| {
                let mu = mu.max(1e-12);
                if *n > 0.0 {
                    mu - n + n * (n / mu).ln()
                } else {
                    mu
                }
            })
            .sum()
    }
}

fn gauss_cdf(x: f64, mu: f64, sigma: f64) -> f64 {
    0.5 * (1.0 + erf((x - mu) / (sigma * SQRT_2)))
}

fn gauss_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2.0 * PI).sqrt())
}

/// Gaussian probability in `[a, b]` normalised to `range`
fn truncated_gauss(a: f64, b: f64, mu: f64, sigma: f64, range: (f64, f64)) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    let norm = gauss_cdf(range.1, mu, sigma) - gauss_cdf(range.0, mu, sigma);
    if norm <= 0.0 {
        return 0.0;
    }
    (gauss_cdf(b, mu, sigma) - gauss_cdf(a, mu, sigma)) / norm
}

/// `[1, c1, c2, ...]` from the polynomial shape parameters
fn poly_coefficients(shape: &[f64]) -> Vec<f64> {
    std::iter::once(1.0).chain(shape.iter().copied()).collect()
}

/// Primitive of the polynomial from 0 to `t`
fn poly_primitive(c: &[f64], t: f64) -> f64 {
    c.iter()
        .enumerate()
        .map(|(k, c)| c * t.powi(k as i32 + 1) / (k as f64 + 1.0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist() -> Hist1D {
        Hist1D::uniform("h", 40, 0.0, 4.0).unwrap()
    }

    fn check_normalised(model: &FitModel, params: &[f64]) {
        let total = model.expected(params).iter().sum::<f64>();
        assert!((total - params[0]).abs() < 1e-9 * params[0], "{total}");

        // density integrates to the per-bin prediction
        let (lo, hi) = model.range();
        let n = 4000;
        let dx = (hi - lo) / n as f64;
        let integral = (0..n)
            .map(|i| model.density(params, lo + (i as f64 + 0.5) * dx, Part::Total) * dx)
            .sum::<f64>();
        assert!((integral - params[0]).abs() < 1e-4 * params[0], "{integral}");
    }

    #[test]
    fn shapes_are_normalised() {
        let h = hist();
        let model = FitModel::for_hist(&h, 2.0).with_signal(SignalShape::Gaussian);
        check_normalised(&model, &[50.0, 1.0, 0.8]);

        let model = FitModel::for_hist(&h, 2.0).with_signal(SignalShape::DoubleGaus);
        check_normalised(&model, &[50.0, 2.5, 0.2, 1.5, 0.3]);

        let model = FitModel::for_hist(&h, 2.0)
            .with_background(BackgroundShape::Expo)
            .with_signal(SignalShape::Gaussian);
        check_normalised(&model, &[80.0, -0.7, 0.0, 2.0, 0.1]);

        let model = FitModel::for_hist(&h, 2.0)
            .with_background(BackgroundShape::Pol2)
            .with_signal(SignalShape::Gaussian);
        check_normalised(&model, &[80.0, 0.5, 2.0, 0.0, 2.0, 0.1]);
    }

    #[test]
    fn template_is_normalised_in_range() {
        let kde = Kde::new((0..50).map(|i| 1.0 + 0.05 * i as f64).collect()).unwrap();
        let model = FitModel::for_hist(&hist(), 2.0).with_template(kde);
        check_normalised(&model, &[120.0]);
    }

    #[test]
    fn parameter_layout() {
        let kde = Kde::new(vec![1.0, 2.0, 3.0]).unwrap();
        let model = FitModel::for_hist(&hist(), 2.0)
            .with_signal(SignalShape::DoubleGaus)
            .with_background(BackgroundShape::NoBkg)
            .with_background(BackgroundShape::Pol1)
            .with_template(kde);

        assert_eq!(
            model.parameter_names(),
            vec!["n_sig_0", "mu_0", "sigma1_0", "sigma2_0", "frac_0", "n_bkg_0", "c1_0", "n_templ"]
        );
        assert_eq!(model.offsets(), vec![0, 5, 7]);
        assert_eq!(model.parameter_index("c1_0"), Some(6));
        assert_eq!(model.peak(&[1.0, 2.0, 0.1, 0.2, 0.5, 1.0, 0.0, 1.0]), Some((2.0, 0.1)));
    }

    #[test]
    fn starting_values() {
        let mut h = hist();
        h.fill(1.0, 100.0);
        let model = FitModel::for_hist(&h, 9.0)
            .with_signal(SignalShape::Gaussian)
            .with_background(BackgroundShape::Expo);
        let parameters = model.parameters(&h).unwrap();

        assert_eq!(parameters[0].init, 5.0);
        // nominal mass outside of the range is pulled onto the limit
        assert_eq!(parameters[1].init, 4.0);
        assert_eq!(parameters[3].init, 80.0);

        let background_only = FitModel::for_hist(&h, 2.0).with_background(BackgroundShape::Expo);
        assert!(matches!(
            background_only.parameters(&h),
            Err(Error::EmptyModel)
        ));
    }

    #[test]
    fn deviance_vanishes_at_truth() {
        let model = FitModel::for_hist(&hist(), 2.0)
            .with_signal(SignalShape::Gaussian)
            .with_background(BackgroundShape::Expo);
        let truth = [200.0, 2.0, 0.2, 1000.0, -0.5];
        let counts = model.expected(&truth);
        let nll = BinnedNll::new(&model, &counts);

        assert!(nll.value(&truth).abs() < 1e-9);
        assert!(nll.value(&[210.0, 2.0, 0.2, 1000.0, -0.5]) > 0.0);
    }

    #[test]
    fn flat_limits() {
        let c = poly_coefficients(&[0.0]);
        assert_eq!(poly_primitive(&c, 0.5), 0.5);
        let expo = Component::Background(BackgroundShape::Expo);
        assert!((expo.integral(&[0.0], 1.0, 2.0, (0.0, 4.0)) - 0.25).abs() < 1e-12);
        assert_eq!(expo.integral(&[1.0], 5.0, 6.0, (0.0, 4.0)), 0.0);
    }
}
