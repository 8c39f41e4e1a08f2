//! Readers for the published tables of each theory calculation

// standard library
use std::path::Path;
use std::str::FromStr;

// crate modules
use crate::error::{Error, Result};
use crate::spline::Spline;
use crate::table::Table;

// external crates
use hfxs_hist::{Graph, Point};
use log::debug;

/// Theory calculations with a known table layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    /// FONLL, bin-integrated unless `pt_differential`
    Fonll { pt_differential: bool },
    /// GM-VFNS with scale variation band
    Gmvfns,
    /// GM-VFNS in the SACOT-mT scheme with PDF and scale errors
    SacotMt,
    /// kT-factorisation
    KtFactorisation,
    /// TAMU transport model
    Tamu,
    /// PHSD transport model
    Phsd,
    /// MC@sHQ with three energy-loss variants
    McAtsHq,
    /// Catania transport model
    Catania,
}

impl FromStr for Model {
    type Err = Error;

    /// Parse a model from its command line name
    ///
    /// ```rust
    /// # use hfxs_theory::Model;
    /// assert_eq!("fonll".parse::<Model>().unwrap(), Model::Fonll { pt_differential: false });
    /// assert_eq!("SACOT-mT".parse::<Model>().unwrap(), Model::SacotMt);
    /// assert!("lattice".parse::<Model>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let model = match s.to_lowercase().replace('_', "-").as_str() {
            "fonll" => Model::Fonll {
                pt_differential: false,
            },
            "fonll-ptdiff" | "fonll-pt-diff" => Model::Fonll {
                pt_differential: true,
            },
            "gmvfns" | "gm-vfns" => Model::Gmvfns,
            "sacot" | "sacot-mt" => Model::SacotMt,
            "ktfact" | "kt-fact" | "kt-factorisation" => Model::KtFactorisation,
            "tamu" => Model::Tamu,
            "phsd" => Model::Phsd,
            "mcatshq" | "mc@shq" => Model::McAtsHq,
            "catania" => Model::Catania,
            _ => {
                return Err(Error::UnknownModel {
                    name: s.to_string(),
                })
            }
        };
        Ok(model)
    }
}

impl Model {
    /// Read a prediction from a table file
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<Prediction> {
        let path = path.as_ref();
        debug!("Reading {self:?} prediction from {}", path.display());
        self.parse_table(&Table::read(path)?)
    }

    /// Interpret an already parsed table
    pub fn parse_table(&self, table: &Table) -> Result<Prediction> {
        match self {
            Model::Fonll {
                pt_differential: true,
            } => Ok(Prediction {
                pt: table.column("pt")?,
                central: table.column("central")?,
                min: Some(table.column("min")?),
                max: Some(table.column("max")?),
                bins: None,
            }),
            Model::Fonll {
                pt_differential: false,
            } => {
                let lo = table.column("ptmin")?;
                let hi = table.column("ptmax")?;
                let widths = lo.iter().zip(&hi).map(|(l, h)| h - l).collect::<Vec<f64>>();
                let per_width = |name: &str| -> Result<Vec<f64>> {
                    Ok(table
                        .column(name)?
                        .iter()
                        .zip(&widths)
                        .map(|(v, w)| v / w)
                        .collect())
                };
                Ok(Prediction {
                    pt: midpoints(&lo, &hi),
                    central: per_width("central")?,
                    min: Some(per_width("min")?),
                    max: Some(per_width("max")?),
                    bins: Some(lo.into_iter().zip(hi).collect()),
                })
            }
            Model::Gmvfns => Ok(Prediction {
                pt: table.column("pT")?,
                central: table.column("cen")?,
                min: Some(table.column("min")?),
                max: Some(table.column("max")?),
                bins: None,
            }),
            Model::SacotMt => {
                let xsec = table.column("xsec[mb]")?;
                let pdf = table.column("PDFerr[mb]")?;
                let down = table.column("down.scale.err[mb]")?;
                let up = table.column("up.scale.err[mb]")?;

                let shifted = |scale: &[f64], sign: f64| -> Vec<f64> {
                    xsec.iter()
                        .zip(&pdf)
                        .zip(scale)
                        .map(|((x, p), s)| x + sign * p.hypot(*s))
                        .collect()
                };
                Ok(Prediction {
                    pt: table.column("pT")?,
                    min: Some(shifted(&down, -1.0)),
                    max: Some(shifted(&up, 1.0)),
                    central: xsec,
                    bins: None,
                })
            }
            Model::KtFactorisation => {
                let lo = table.column("ptmin")?;
                let hi = table.column("ptmax")?;
                Ok(Prediction {
                    pt: midpoints(&lo, &hi),
                    central: table.column("central")?,
                    min: Some(table.column("lower")?),
                    max: Some(table.column("upper")?),
                    bins: Some(lo.into_iter().zip(hi).collect()),
                })
            }
            Model::Tamu => {
                let pt = table.column("PtCent")?;
                if table.has_column("R_AA_min") && table.has_column("R_AA_max") {
                    let min = table.column("R_AA_min")?;
                    let max = table.column("R_AA_max")?;
                    Ok(Prediction {
                        pt,
                        central: midpoints(&min, &max),
                        min: Some(min),
                        max: Some(max),
                        bins: None,
                    })
                } else {
                    Ok(Prediction::central_only(pt, table.column("R_AA")?))
                }
            }
            Model::Phsd | Model::Catania => Ok(Prediction::central_only(
                table.column("pt")?,
                table.column("Raa")?,
            )),
            Model::McAtsHq => {
                let variants = [
                    table.column("RAAcolK1.5")?,
                    table.column("RAAcolradLPMK0.8")?,
                    table.column("RAAcolradLPMgludampK0.8")?,
                ];
                let (min, max): (Vec<f64>, Vec<f64>) = (0..table.len())
                    .map(|i| {
                        let values = variants.iter().map(|v| v[i]);
                        (
                            values.clone().fold(f64::INFINITY, f64::min),
                            values.fold(f64::NEG_INFINITY, f64::max),
                        )
                    })
                    .unzip();
                Ok(Prediction {
                    pt: table.column("pt")?,
                    central: midpoints(&min, &max),
                    min: Some(min),
                    max: Some(max),
                    bins: None,
                })
            }
        }
    }
}

/// A prediction as a function of pT with an optional uncertainty band
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// pT of each value, bin centres for binned tables
    pub pt: Vec<f64>,
    pub central: Vec<f64>,
    /// Lower edge of the band
    pub min: Option<Vec<f64>>,
    /// Upper edge of the band
    pub max: Option<Vec<f64>>,
    /// pT intervals for binned tables
    pub bins: Option<Vec<(f64, f64)>>,
}

/// Splines through the central values and the band edges
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSplines {
    pub central: Spline,
    pub min: Option<Spline>,
    pub max: Option<Spline>,
}

impl Prediction {
    /// A prediction without an uncertainty band
    pub fn central_only(pt: Vec<f64>, central: Vec<f64>) -> Self {
        Self {
            pt,
            central,
            min: None,
            max: None,
            bins: None,
        }
    }

    /// Number of pT points
    pub fn len(&self) -> usize {
        self.pt.len()
    }

    /// True if there are no points
    pub fn is_empty(&self) -> bool {
        self.pt.is_empty()
    }

    /// Interpolate the prediction
    ///
    /// Returns `None` when there are too few points for a spline. Band
    /// edges that are all zero are left out.
    pub fn splines(&self) -> Result<Option<PredictionSplines>> {
        if self.len() < Spline::MIN_POINTS {
            return Ok(None);
        }

        let band = |edge: &Option<Vec<f64>>| -> Result<Option<Spline>> {
            match edge {
                Some(values) if values.iter().any(|v| *v != 0.0) => {
                    Ok(Some(Spline::new(&self.pt, values)?))
                }
                _ => Ok(None),
            }
        };

        Ok(Some(PredictionSplines {
            central: Spline::new(&self.pt, &self.central)?,
            min: band(&self.min)?,
            max: band(&self.max)?,
        }))
    }

    /// Band as a graph of asymmetric errors around the central values
    ///
    /// ```rust
    /// # use hfxs_theory::Prediction;
    /// let prediction = Prediction {
    ///     pt: vec![1.5, 3.0],
    ///     central: vec![10.0, 4.0],
    ///     min: Some(vec![8.0, 3.0]),
    ///     max: Some(vec![13.0, 4.5]),
    ///     bins: Some(vec![(1.0, 2.0), (2.0, 4.0)]),
    /// };
    ///
    /// let graph = prediction.to_graph("g_fonll").unwrap();
    /// assert_eq!(graph.points[1].exl, 1.0);
    /// assert_eq!(graph.points[1].eyl, 1.0);
    /// assert_eq!(graph.points[1].eyh, 0.5);
    /// ```
    pub fn to_graph(&self, name: &str) -> Result<Graph> {
        let points = (0..self.len())
            .map(|i| {
                let (x, c) = (self.pt[i], self.central[i]);
                let (exl, exh) = match &self.bins {
                    Some(bins) => (x - bins[i].0, bins[i].1 - x),
                    None => (0.0, 0.0),
                };
                let eyl = self.min.as_ref().map_or(0.0, |m| (c - m[i]).max(0.0));
                let eyh = self.max.as_ref().map_or(0.0, |m| (m[i] - c).max(0.0));
                Point {
                    x,
                    y: c,
                    exl,
                    exh,
                    eyl,
                    eyh,
                }
            })
            .collect();
        Ok(Graph::new(name, points)?)
    }
}

fn midpoints(lo: &[f64], hi: &[f64]) -> Vec<f64> {
    lo.iter().zip(hi).map(|(l, h)| 0.5 * (l + h)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> Table {
        Table::parse(text).unwrap()
    }

    #[test]
    fn fonll_binned_divides_by_width() {
        let t = table("# ptmin ptmax central min max\n0 2 10 8 12\n2 6 4 2 8\n");
        let p = Model::Fonll {
            pt_differential: false,
        }
        .parse_table(&t)
        .unwrap();
        assert_eq!(p.pt, vec![1.0, 4.0]);
        assert_eq!(p.central, vec![5.0, 1.0]);
        assert_eq!(p.max, Some(vec![6.0, 2.0]));
        assert_eq!(p.bins, Some(vec![(0.0, 2.0), (2.0, 6.0)]));
    }

    #[test]
    fn sacot_combines_errors() {
        let t = table(
            "pT xsec[mb] PDFerr[mb] down.scale.err[mb] up.scale.err[mb]\n\
             2 10 3 4 0\n",
        );
        let p = Model::SacotMt.parse_table(&t).unwrap();
        assert_eq!(p.min, Some(vec![5.0]));
        assert_eq!(p.max, Some(vec![13.0]));
    }

    #[test]
    fn tamu_average_of_band() {
        let band = table("PtCent R_AA_min R_AA_max\n1 0.2 0.4\n");
        let p = Model::Tamu.parse_table(&band).unwrap();
        assert!((p.central[0] - 0.3).abs() < 1e-12);

        let line = table("PtCent R_AA\n1 0.2\n");
        let p = Model::Tamu.parse_table(&line).unwrap();
        assert_eq!(p.central, vec![0.2]);
        assert_eq!(p.min, None);
    }

    #[test]
    fn mcatshq_envelope() {
        let t = table("pt RAAcolK1.5 RAAcolradLPMK0.8 RAAcolradLPMgludampK0.8\n5 0.4 0.2 0.6\n");
        let p = Model::McAtsHq.parse_table(&t).unwrap();
        assert_eq!(p.min, Some(vec![0.2]));
        assert_eq!(p.max, Some(vec![0.6]));
        assert!((p.central[0] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn too_few_points_for_splines() {
        let p = Prediction::central_only(vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]);
        assert!(p.splines().unwrap().is_none());
    }

    #[test]
    fn zero_band_is_dropped() {
        let p = Prediction {
            pt: vec![1.0, 2.0, 3.0, 4.0],
            central: vec![4.0, 3.0, 2.0, 1.0],
            min: Some(vec![0.0; 4]),
            max: Some(vec![5.0, 4.0, 3.0, 2.0]),
            bins: None,
        };
        let s = p.splines().unwrap().unwrap();
        assert!(s.min.is_none());
        assert!((s.max.unwrap().eval(2.5) - 3.5).abs() < 1e-9);
    }
}
