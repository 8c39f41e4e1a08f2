//! Interpolating cubic splines

// crate modules
use crate::error::{Error, Result};

// external crates
use nalgebra::{DMatrix, DVector};

/// Interpolating cubic spline with not-a-knot end conditions
///
/// The third derivative is continuous across the second and the second to
/// last knots, so four points define a single cubic and any cubic polynomial
/// is reproduced exactly. Outside of the knots the end segments are
/// extended as they are.
///
/// ```rust
/// # use hfxs_theory::Spline;
/// let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
/// let y = x.iter().map(|x| x * x * x).collect::<Vec<f64>>();
///
/// let spline = Spline::new(&x, &y).unwrap();
/// assert!((spline.eval(2.5) - 15.625).abs() < 1e-9);
/// assert!((spline.eval(5.0) - 125.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivative at each knot
    m: Vec<f64>,
}

impl Spline {
    /// Minimum number of knots
    pub const MIN_POINTS: usize = 4;

    /// Fit the spline through every `(x, y)` pair
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }

        let n = x.len();
        if n < Self::MIN_POINTS {
            return Err(Error::TooFewPoints {
                found: n,
                minimum: Self::MIN_POINTS,
            });
        }

        if let Some(index) = x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::KnotsNotAscending { index: index + 1 });
        }

        let h = x.windows(2).map(|w| w[1] - w[0]).collect::<Vec<f64>>();
        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut b = DVector::<f64>::zeros(n);

        // continuity of the first derivative at interior knots
        for i in 1..n - 1 {
            a[(i, i - 1)] = h[i - 1];
            a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            a[(i, i + 1)] = h[i];
            b[i] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }

        // not-a-knot at x[1]
        a[(0, 0)] = h[1];
        a[(0, 1)] = -(h[0] + h[1]);
        a[(0, 2)] = h[0];

        // not-a-knot at x[n-2]
        a[(n - 1, n - 3)] = h[n - 2];
        a[(n - 1, n - 2)] = -(h[n - 3] + h[n - 2]);
        a[(n - 1, n - 1)] = h[n - 3];

        let m = a.lu().solve(&b).ok_or(Error::SingularSystem)?;

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m: m.iter().copied().collect(),
        })
    }

    /// Value of the spline at `x`
    pub fn eval(&self, x: f64) -> f64 {
        let i = self.segment(x);
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);

        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;
        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    /// Values of the spline at many points
    pub fn eval_many(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|x| self.eval(*x)).collect()
    }

    /// Knot positions
    pub fn knots(&self) -> &[f64] {
        &self.x
    }

    /// Index of the segment used for `x`, end segments extend outwards
    fn segment(&self, x: f64) -> usize {
        let last = self.x.len() - 2;
        self.x.partition_point(|k| *k <= x).saturating_sub(1).min(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_knots() {
        let x = [1.0, 2.0, 4.0, 6.0, 8.0, 10.0];
        let y = [40.0, 18.0, 5.0, 1.7, 0.6, 0.25];
        let spline = Spline::new(&x, &y).unwrap();
        for (x, y) in x.iter().zip(y) {
            assert!((spline.eval(*x) - y).abs() < 1e-9);
        }
    }

    #[test]
    fn reproduces_cubic_on_uneven_knots() {
        let poly = |x: f64| 0.5 * x.powi(3) - 2.0 * x * x + x - 7.0;
        let x = [-1.0, 0.3, 2.0, 2.5, 6.0, 9.0];
        let y = x.iter().map(|x| poly(*x)).collect::<Vec<f64>>();
        let spline = Spline::new(&x, &y).unwrap();
        for t in [-3.0, 0.0, 1.1, 4.2, 8.9, 12.0] {
            assert!((spline.eval(t) - poly(t)).abs() < 1e-8 * poly(t).abs().max(1.0));
        }
    }

    #[test]
    fn rejects_bad_knots() {
        assert!(matches!(
            Spline::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]),
            Err(Error::TooFewPoints { found: 3, .. })
        ));
        assert!(matches!(
            Spline::new(&[0.0, 1.0, 1.0, 2.0], &[0.0; 4]),
            Err(Error::KnotsNotAscending { index: 2 })
        ));
        assert!(matches!(
            Spline::new(&[0.0, 1.0, 2.0, 3.0], &[0.0; 3]),
            Err(Error::LengthMismatch { .. })
        ));
    }
}
