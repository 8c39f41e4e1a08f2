//! Variable-width one-dimensional histograms

// crate modules
use crate::error::{Error, Result};

// external crates
use hfxs_utils::{f, SliceExt, ValueExt};
use serde::{Deserialize, Serialize};

/// One-dimensional histogram with variable bin widths
///
/// Contents and errors are stored per bin, with `edges` one element longer
/// than either. There are no under/overflow bins, anything outside of the
/// axis is simply not recorded.
///
/// ```rust
/// # use hfxs_hist::Hist1D;
/// let mut hist = Hist1D::new("h_pt", vec![0.0, 1.0, 3.0]).unwrap();
/// hist.fill(0.5, 1.0);
/// hist.fill(2.0, 4.0);
///
/// assert_eq!(hist.contents, vec![1.0, 4.0]);
/// assert_eq!(hist.integral(), 9.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist1D {
    /// Object name
    pub name: String,
    /// Free text title, mostly axis labels
    pub title: String,
    /// Bin edges, strictly ascending
    pub edges: Vec<f64>,
    /// Bin contents
    pub contents: Vec<f64>,
    /// Absolute bin errors
    pub errors: Vec<f64>,
}

impl Hist1D {
    /// Empty histogram with the given bin edges
    pub fn new(name: &str, edges: Vec<f64>) -> Result<Self> {
        check_edges(&edges)?;
        let nbins = edges.len() - 1;
        Ok(Self {
            name: name.to_string(),
            title: String::new(),
            edges,
            contents: vec![0.0; nbins],
            errors: vec![0.0; nbins],
        })
    }

    /// Histogram with every bin already set
    ///
    /// ```rust
    /// # use hfxs_hist::Hist1D;
    /// let hist = Hist1D::with_values("h", vec![0.0, 1.0], vec![2.0], vec![0.5]).unwrap();
    /// assert_eq!(hist.nbins(), 1);
    ///
    /// // lengths have to agree with the binning
    /// assert!(Hist1D::with_values("h", vec![0.0, 1.0], vec![2.0, 3.0], vec![0.5]).is_err());
    /// ```
    pub fn with_values(
        name: &str,
        edges: Vec<f64>,
        contents: Vec<f64>,
        errors: Vec<f64>,
    ) -> Result<Self> {
        check_edges(&edges)?;
        let nbins = edges.len() - 1;
        check_length("contents", nbins, contents.len())?;
        check_length("errors", nbins, errors.len())?;
        Ok(Self {
            name: name.to_string(),
            title: String::new(),
            edges,
            contents,
            errors,
        })
    }

    /// Histogram of `nbins` equal width bins between `lo` and `hi`
    ///
    /// ```rust
    /// # use hfxs_hist::Hist1D;
    /// let hist = Hist1D::uniform("h", 4, 0.0, 2.0).unwrap();
    /// assert_eq!(hist.edges, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    /// ```
    pub fn uniform(name: &str, nbins: usize, lo: f64, hi: f64) -> Result<Self> {
        let width = (hi - lo) / nbins as f64;
        let mut edges = (0..nbins).map(|i| lo + i as f64 * width).collect::<Vec<f64>>();
        edges.push(hi);
        Self::new(name, edges)
    }

    /// Builder style title
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Number of bins
    pub fn nbins(&self) -> usize {
        self.contents.len()
    }

    /// Lowest bin edge
    pub fn lo(&self) -> f64 {
        self.edges[0]
    }

    /// Highest bin edge
    pub fn hi(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Width of every bin
    pub fn bin_widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Centre of every bin
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// Index of the bin containing `x`
    ///
    /// Bins are low <= x < high, except that the last upper edge belongs to
    /// the last bin. Returns `None` outside of the axis.
    ///
    /// ```rust
    /// # use hfxs_hist::Hist1D;
    /// let hist = Hist1D::new("h", vec![0.0, 1.0, 2.0]).unwrap();
    /// assert_eq!(hist.find_bin(1.0), Some(1));
    /// assert_eq!(hist.find_bin(2.0), Some(1));
    /// assert_eq!(hist.find_bin(2.5), None);
    /// ```
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        self.edges.find_bin_exclusive(x).ok()
    }

    /// Add `weight` to the bin containing `x`
    ///
    /// Errors are accumulated as the square root of the sum of squared
    /// weights. Returns the bin filled, if any.
    pub fn fill(&mut self, x: f64, weight: f64) -> Option<usize> {
        let bin = self.find_bin(x)?;
        self.contents[bin] += weight;
        self.errors[bin] = self.errors[bin].hypot(weight);
        Some(bin)
    }

    /// Overwrite a single bin
    pub fn set(&mut self, bin: usize, content: f64, error: f64) -> Result<()> {
        if bin >= self.nbins() {
            return Err(Error::BinOutOfRange {
                bin,
                nbins: self.nbins(),
            });
        }
        self.contents[bin] = content;
        self.errors[bin] = error;
        Ok(())
    }

    /// Multiply contents and errors by a constant
    pub fn scale(&mut self, factor: f64) {
        self.contents.iter_mut().for_each(|c| *c *= factor);
        self.errors.iter_mut().for_each(|e| *e *= factor.abs());
    }

    /// Sum of contents weighted by bin width
    pub fn integral(&self) -> f64 {
        self.contents
            .iter()
            .zip(self.bin_widths())
            .map(|(c, w)| c * w)
            .sum()
    }

    /// Plain sum of bin contents
    pub fn sum(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// True if both histograms have identical bin edges
    pub fn same_binning(&self, other: &Hist1D) -> bool {
        self.edges.len() == other.edges.len()
            && self
                .edges
                .iter()
                .zip(&other.edges)
                .all(|(a, b)| (a - b).abs() <= 1e-9 * a.abs().max(1.0))
    }

    /// Bin-wise ratio of two histograms
    ///
    /// Errors are propagated assuming the two are uncorrelated. A bin with a
    /// zero denominator is set to 0 ± 0.
    ///
    /// ```rust
    /// # use hfxs_hist::Hist1D;
    /// let edges = vec![0.0, 1.0, 2.0];
    /// let a = Hist1D::with_values("a", edges.clone(), vec![4.0, 1.0], vec![0.5, 0.1]).unwrap();
    /// let b = Hist1D::with_values("b", edges, vec![2.0, 0.0], vec![0.0, 0.0]).unwrap();
    ///
    /// let ratio = a.divide(&b).unwrap();
    /// assert_eq!(ratio.contents, vec![2.0, 0.0]);
    /// assert_eq!(ratio.errors, vec![0.25, 0.0]);
    /// ```
    pub fn divide(&self, other: &Hist1D) -> Result<Hist1D> {
        if !self.same_binning(other) {
            return Err(Error::BinningMismatch {
                left: self.name.clone(),
                right: other.name.clone(),
            });
        }

        let mut ratio = Hist1D::new(&f!("{}_over_{}", self.name, other.name), self.edges.clone())?;
        for i in 0..self.nbins() {
            let (a, ea) = (self.contents[i], self.errors[i]);
            let (b, eb) = (other.contents[i], other.errors[i]);
            if b == 0.0 {
                continue;
            }
            ratio.contents[i] = a / b;
            ratio.errors[i] = (ea * ea * b * b + eb * eb * a * a).sqrt() / (b * b);
        }
        Ok(ratio)
    }
}

impl std::fmt::Display for Hist1D {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "Hist1D '{}' ({} bins, {} to {})",
            self.name,
            self.nbins(),
            self.lo(),
            self.hi()
        )?;
        for i in 0..self.nbins() {
            writeln!(
                f,
                "  [{:>8}, {:>8}) {}",
                self.edges[i],
                self.edges[i + 1],
                self.contents[i].pm(self.errors[i], 4)
            )?;
        }
        Ok(())
    }
}

/// Edges must define at least one bin and be strictly ascending
pub(crate) fn check_edges(edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::TooFewEdges { found: edges.len() });
    }
    match edges.windows(2).position(|w| w[0] >= w[1] || !w[1].is_finite()) {
        Some(index) => Err(Error::EdgesNotAscending { index: index + 1 }),
        None => Ok(()),
    }
}

fn check_length(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::InconsistentLength {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_edges() {
        assert!(matches!(
            Hist1D::new("h", vec![1.0]),
            Err(Error::TooFewEdges { found: 1 })
        ));
        assert!(matches!(
            Hist1D::new("h", vec![0.0, 2.0, 1.0]),
            Err(Error::EdgesNotAscending { index: 2 })
        ));
        assert!(Hist1D::new("h", vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn fill_accumulates_errors_in_quadrature() {
        let mut hist = Hist1D::new("h", vec![0.0, 1.0]).unwrap();
        hist.fill(0.5, 3.0);
        hist.fill(0.5, 4.0);
        assert_eq!(hist.contents[0], 7.0);
        assert_eq!(hist.errors[0], 5.0);
        assert_eq!(hist.fill(1.5, 1.0), None);
    }

    #[test]
    fn integral_uses_widths() {
        let hist =
            Hist1D::with_values("h", vec![1.0, 2.0, 4.0], vec![3.0, 2.0], vec![0.0, 0.0]).unwrap();
        assert_eq!(hist.bin_widths(), vec![1.0, 2.0]);
        assert_eq!(hist.centers(), vec![1.5, 3.0]);
        assert_eq!(hist.integral(), 7.0);
        assert_eq!(hist.sum(), 5.0);
    }

    #[test]
    fn scale_keeps_errors_positive() {
        let mut hist =
            Hist1D::with_values("h", vec![0.0, 1.0], vec![2.0], vec![0.5]).unwrap();
        hist.scale(-2.0);
        assert_eq!(hist.contents, vec![-4.0]);
        assert_eq!(hist.errors, vec![1.0]);
    }

    #[test]
    fn divide_requires_same_binning() {
        let a = Hist1D::new("a", vec![0.0, 1.0]).unwrap();
        let b = Hist1D::new("b", vec![0.0, 2.0]).unwrap();
        assert!(matches!(a.divide(&b), Err(Error::BinningMismatch { .. })));
    }

    #[test]
    fn set_checks_range() {
        let mut hist = Hist1D::uniform("h", 2, 0.0, 1.0).unwrap();
        hist.set(1, 3.0, 0.1).unwrap();
        assert_eq!(hist.contents, vec![0.0, 3.0]);
        assert!(hist.set(2, 1.0, 0.0).is_err());
    }
}
