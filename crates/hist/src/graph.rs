//! Point sets with asymmetric error bars

// crate modules
use crate::error::{Error, Result};
use crate::hist::Hist1D;

// external crates
use serde::{Deserialize, Serialize};

/// A single point with asymmetric errors in x and y
///
/// All error components are absolute and non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Error below x
    pub exl: f64,
    /// Error above x
    pub exh: f64,
    /// Error below y
    pub eyl: f64,
    /// Error above y
    pub eyh: f64,
}

impl Point {
    /// Point with no errors
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// Point with symmetric errors on both axes
    pub fn symmetric(x: f64, y: f64, ex: f64, ey: f64) -> Self {
        Self {
            x,
            y,
            exl: ex,
            exh: ex,
            eyl: ey,
            eyh: ey,
        }
    }

    /// Lower y bound of the error bar
    pub fn y_low(&self) -> f64 {
        self.y - self.eyl
    }

    /// Upper y bound of the error bar
    pub fn y_high(&self) -> f64 {
        self.y + self.eyh
    }
}

/// Named collection of [Point]s
///
/// Used for theory bands and for measurements from other experiments where
/// errors are not symmetric.
///
/// ```rust
/// # use hfxs_hist::{Graph, Point};
/// let graph = Graph::new("g_band", vec![
///     Point { x: 1.0, y: 4.0, exl: 0.5, exh: 0.5, eyl: 1.0, eyh: 2.0 },
///     Point { x: 2.0, y: 2.0, exl: 0.5, exh: 0.5, eyl: 0.5, eyh: 0.5 },
/// ]).unwrap();
///
/// let band = graph.relative_band();
/// assert_eq!(band.points[0].y, 1.0);
/// assert_eq!(band.points[0].eyh, 0.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Object name
    pub name: String,
    /// Free text title, mostly axis labels
    pub title: String,
    /// Points in the order they were added
    pub points: Vec<Point>,
}

impl Graph {
    /// Graph from a list of points, rejecting negative error components
    pub fn new(name: &str, points: Vec<Point>) -> Result<Self> {
        if let Some(index) = points
            .iter()
            .position(|p| p.exl < 0.0 || p.exh < 0.0 || p.eyl < 0.0 || p.eyh < 0.0)
        {
            return Err(Error::NegativeError { index });
        }
        Ok(Self {
            name: name.to_string(),
            title: String::new(),
            points,
        })
    }

    /// Points at the bin centres of a histogram
    ///
    /// The x errors span half the bin width and y errors are the bin errors.
    pub fn from_hist(hist: &Hist1D) -> Self {
        let points = hist
            .edges
            .windows(2)
            .zip(hist.contents.iter().zip(&hist.errors))
            .map(|(w, (&y, &e))| {
                let half = 0.5 * (w[1] - w[0]);
                Point::symmetric(w[0] + half, y, half, e)
            })
            .collect();

        Self {
            name: hist.name.clone(),
            title: hist.title.clone(),
            points,
        }
    }

    /// Histogram with the graph's central values
    ///
    /// Edges are taken from the low x error of every point plus the high x
    /// error of the last one. Errors are set negligibly small so that only
    /// a central line is drawn.
    ///
    /// ```rust
    /// # use hfxs_hist::{Graph, Point};
    /// let graph = Graph::new("g", vec![
    ///     Point::symmetric(1.5, 3.0, 0.5, 1.0),
    ///     Point::symmetric(3.0, 1.0, 1.0, 1.0),
    /// ]).unwrap();
    ///
    /// let hist = graph.to_hist("h").unwrap();
    /// assert_eq!(hist.edges, vec![1.0, 2.0, 4.0]);
    /// assert_eq!(hist.contents, vec![3.0, 1.0]);
    /// ```
    pub fn to_hist(&self, name: &str) -> Result<Hist1D> {
        let edges = self.edges()?;
        let contents = self.points.iter().map(|p| p.y).collect();
        let errors = vec![1e-10; self.points.len()];
        Ok(Hist1D::with_values(name, edges, contents, errors)?.with_title(&self.title))
    }

    /// Bin edges implied by the x errors of the points
    pub fn edges(&self) -> Result<Vec<f64>> {
        let Some(last) = self.points.last() else {
            return Err(Error::EmptyGraph {
                name: self.name.clone(),
            });
        };
        let mut edges = self.points.iter().map(|p| p.x - p.exl).collect::<Vec<f64>>();
        edges.push(last.x + last.exh);
        Ok(edges)
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True for a graph without points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Multiply y values and y errors by a constant
    pub fn scale(&mut self, factor: f64) {
        for p in self.points.iter_mut() {
            p.y *= factor;
            p.eyl *= factor.abs();
            p.eyh *= factor.abs();
        }
    }

    /// Band of relative y errors around unity
    ///
    /// Points with zero y keep zero width.
    pub fn relative_band(&self) -> Graph {
        let points = self
            .points
            .iter()
            .map(|p| {
                let (eyl, eyh) = match p.y {
                    y if y != 0.0 => ((p.eyl / y).abs(), (p.eyh / y).abs()),
                    _ => (0.0, 0.0),
                };
                Point {
                    y: 1.0,
                    eyl,
                    eyh,
                    ..*p
                }
            })
            .collect();

        Graph {
            name: format!("{}_rel", self.name),
            title: self.title.clone(),
            points,
        }
    }

    /// Copy keeping only points whose x passes `predicate`
    pub fn filter_x<F: Fn(f64) -> bool>(&self, predicate: F) -> Graph {
        Graph {
            name: self.name.clone(),
            title: self.title.clone(),
            points: self.points.iter().filter(|p| predicate(p.x)).copied().collect(),
        }
    }

    /// Point-wise ratio of y values to a reference graph
    ///
    /// The relative errors of this graph are preserved, the reference is
    /// taken as exact. A zero reference gives 0 ± 0.
    ///
    /// ```rust
    /// # use hfxs_hist::{Graph, Point};
    /// let data = Graph::new("data", vec![Point::symmetric(1.0, 6.0, 0.5, 3.0)]).unwrap();
    /// let theory = Graph::new("theory", vec![Point::symmetric(1.0, 2.0, 0.5, 1.0)]).unwrap();
    ///
    /// let ratio = data.ratio_to(&theory).unwrap();
    /// assert_eq!(ratio.points[0].y, 3.0);
    /// assert_eq!(ratio.points[0].eyl, 1.5);
    /// ```
    pub fn ratio_to(&self, reference: &Graph) -> Result<Graph> {
        if self.len() != reference.len() {
            return Err(Error::PointCountMismatch {
                left: self.len(),
                right: reference.len(),
            });
        }

        let points = self
            .points
            .iter()
            .zip(&reference.points)
            .map(|(p, r)| match r.y {
                y if y != 0.0 => Point {
                    y: p.y / y,
                    eyl: (p.eyl / y).abs(),
                    eyh: (p.eyh / y).abs(),
                    ..*p
                },
                _ => Point {
                    y: 0.0,
                    eyl: 0.0,
                    eyh: 0.0,
                    ..*p
                },
            })
            .collect();

        Ok(Graph {
            name: format!("{}_over_{}", self.name, reference.name),
            title: self.title.clone(),
            points,
        })
    }
}

impl From<&Hist1D> for Graph {
    fn from(hist: &Hist1D) -> Self {
        Graph::from_hist(hist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_errors_rejected() {
        let p = Point {
            eyl: -1.0,
            ..Point::new(1.0, 1.0)
        };
        assert!(matches!(
            Graph::new("g", vec![Point::new(0.0, 0.0), p]),
            Err(Error::NegativeError { index: 1 })
        ));
    }

    #[test]
    fn from_hist_uses_half_widths() {
        let hist =
            Hist1D::with_values("h", vec![0.0, 2.0, 6.0], vec![1.0, 2.0], vec![0.1, 0.2]).unwrap();
        let graph = Graph::from_hist(&hist);
        assert_eq!(graph.points[1], Point::symmetric(4.0, 2.0, 2.0, 0.2));
        assert_eq!(graph.edges().unwrap(), hist.edges);
    }

    #[test]
    fn empty_graph_has_no_edges() {
        let graph = Graph::new("g", vec![]).unwrap();
        assert!(matches!(graph.edges(), Err(Error::EmptyGraph { .. })));
        assert!(graph.to_hist("h").is_err());
    }

    #[test]
    fn filter_and_scale() {
        let mut graph = Graph::new(
            "g",
            (1..=4).map(|i| Point::symmetric(i as f64, 2.0, 0.5, 1.0)).collect(),
        )
        .unwrap();
        graph.scale(0.5);
        let kept = graph.filter_x(|x| x < 3.0);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.points[0].y, 1.0);
        assert_eq!(kept.points[0].eyh, 0.5);
    }

    #[test]
    fn ratio_to_zero_reference() {
        let a = Graph::new("a", vec![Point::symmetric(1.0, 1.0, 0.0, 1.0)]).unwrap();
        let b = Graph::new("b", vec![Point::new(1.0, 0.0)]).unwrap();
        let r = a.ratio_to(&b).unwrap();
        assert_eq!(r.points[0].y, 0.0);
        assert_eq!(r.points[0].eyh, 0.0);
        assert!(a.ratio_to(&Graph::default()).is_err());
    }
}
