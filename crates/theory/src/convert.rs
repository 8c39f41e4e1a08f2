//! Conversion of theory text tables into store files

// standard library
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::model::Model;
use crate::table::Table;

// external crates
use hfxs_hist::{Graph, Hist1D, Store};
use log::{debug, info};

/// Binning of the NNLO+NNLL tables
#[derive(Debug, Clone, PartialEq)]
pub struct NnloBinning {
    /// pT edges shared by the differential tables
    pub pt_edges: Vec<f64>,
    /// Rapidity windows of the forward/central ratios
    pub rapidity_windows: Vec<(f64, f64)>,
}

impl Default for NnloBinning {
    fn default() -> Self {
        Self {
            pt_edges: vec![1.0, 2.0, 4.0, 6.0, 8.0, 10.0, 14.0, 23.5],
            rapidity_windows: vec![(2.0, 2.5), (3.0, 3.5), (4.0, 4.5)],
        }
    }
}

/// A `central err_low err_high` row, with `err_low` as a positive magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRow {
    pub central: f64,
    pub low: f64,
    pub high: f64,
}

/// Read a headerless `central err_low err_high` table
///
/// The lower error is published as a negative shift and is stored as its
/// magnitude.
pub fn read_band_rows<P: AsRef<Path>>(path: P) -> Result<Vec<BandRow>> {
    let table = Table::read_headless(path, &["central", "err_low", "err_high"])?;
    Ok(table
        .rows
        .iter()
        .map(|r| BandRow {
            central: r[0],
            low: r[1].abs(),
            high: r[2].abs(),
        })
        .collect())
}

/// Histogram of central values and the matching asymmetric graph
fn band_objects(name_suffix: &str, edges: &[f64], rows: &[BandRow]) -> Result<(Hist1D, Graph)> {
    let contents = rows.iter().map(|r| r.central).collect();
    let hist = Hist1D::with_values(
        &format!("h_{name_suffix}"),
        edges.to_vec(),
        contents,
        vec![0.0; rows.len()],
    )?;

    let mut graph = Graph::from_hist(&hist);
    graph.name = format!("g_{name_suffix}");
    for (point, row) in graph.points.iter_mut().zip(rows) {
        point.eyl = row.low;
        point.eyh = row.high;
    }
    Ok((hist, graph))
}

/// File name of a rapidity ratio table, e.g. `ALICE_LHCb_ratio_2-2.5.dat`
pub fn ratio_file_name(window: (f64, f64)) -> String {
    format!("ALICE_LHCb_ratio_{}-{:.1}.dat", window.0, window.1)
}

/// Object suffix of a rapidity ratio, e.g. `rap_ratio_2_2.5`
pub fn ratio_suffix(window: (f64, f64)) -> String {
    format!("rap_ratio_{}_{:.1}", window.0, window.1)
}

/// Convert the NNLO+NNLL tables in `dir` into a single store
///
/// Expects `ALICE_histogram.dat`, one ratio file per rapidity window and
/// `ALICE_extrapolation.dat`, each with one row per pT bin (one row for the
/// extrapolation).
pub fn convert_nnlo_nnll<P: AsRef<Path>>(dir: P, binning: &NnloBinning) -> Result<Store> {
    let dir = dir.as_ref();
    let nbins = binning.pt_edges.len().saturating_sub(1);
    let mut store = Store::new();

    let read_checked = |file: &str, expected: usize| -> Result<Vec<BandRow>> {
        let rows = read_band_rows(dir.join(file))?;
        if rows.len() != expected {
            return Err(Error::RowCount {
                file: file.to_string(),
                expected,
                found: rows.len(),
            });
        }
        debug!("Read {} rows from {file}", rows.len());
        Ok(rows)
    };

    // pT differential cross section
    let rows = read_checked("ALICE_histogram.dat", nbins)?;
    let (h, g) = band_objects("cross_sec", &binning.pt_edges, &rows)?;
    store.insert(&h.name.clone(), h);
    store.insert(&g.name.clone(), g);

    // ratios between rapidity windows
    for window in &binning.rapidity_windows {
        let rows = read_checked(&ratio_file_name(*window), nbins)?;
        let (h, g) = band_objects(&ratio_suffix(*window), &binning.pt_edges, &rows)?;
        store.insert(&h.name.clone(), h);
        store.insert(&g.name.clone(), g);
    }

    // extrapolation factor as a single bin on [0, 1]
    let rows = read_checked("ALICE_extrapolation.dat", 1)?;
    let (h, g) = band_objects("extrap", &[0.0, 1.0], &rows)?;
    store.insert(&h.name.clone(), h);
    store.insert(&g.name.clone(), g);

    info!("Converted {} NNLO+NNLL objects from {}", store.len(), dir.display());
    Ok(store)
}

/// Fill a uniform histogram from a `pt central` table
///
/// Each row sets the bin containing its pT, rows outside of the axis are
/// skipped.
///
/// ```rust
/// # use hfxs_theory::{convert_fonll_table, Table};
/// let table = Table::parse("# pt central\n0.5 10.0\n1.5 8.0\n150 1.0\n").unwrap();
/// let hist = convert_fonll_table(&table, 100, 0.0, 100.0).unwrap();
///
/// assert_eq!(hist.contents[0], 10.0);
/// assert_eq!(hist.contents[1], 8.0);
/// assert_eq!(hist.sum(), 18.0);
/// ```
pub fn convert_fonll_table(table: &Table, nbins: usize, lo: f64, hi: f64) -> Result<Hist1D> {
    let mut hist = Hist1D::uniform("h_fonll", nbins, lo, hi)?;
    for (pt, central) in table.column("pt")?.into_iter().zip(table.column("central")?) {
        match hist.find_bin(pt) {
            Some(bin) => hist.set(bin, central, 0.0)?,
            None => debug!("pT {pt} outside of [{lo}, {hi}], skipped"),
        }
    }
    Ok(hist)
}

/// Read a FONLL `pt central` file into a store holding `h_fonll`
pub fn convert_fonll<P: AsRef<Path>>(path: P, nbins: usize, lo: f64, hi: f64) -> Result<Store> {
    let table = Table::read(path)?;
    let mut store = Store::new();
    store.insert("h_fonll", convert_fonll_table(&table, nbins, lo, hi)?);
    Ok(store)
}

/// Read any model table into a store holding its band as a graph
///
/// Binned models also get a histogram of central values, `h_` prefixed.
pub fn convert_model<P: AsRef<Path>>(path: P, model: Model, name: &str) -> Result<Store> {
    let prediction = model.read(path)?;
    let graph = prediction.to_graph(name)?;

    let mut store = Store::new();
    if prediction.bins.is_some() {
        let hist_name = format!("h_{}", name.trim_start_matches("g_"));
        store.insert(&hist_name, graph.to_hist(&hist_name)?);
    }
    store.insert(name, graph);
    Ok(store)
}
