//! Measured spectrum against other experiments and theory, with ratios

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

// crate modules
use crate::error::Result;
use crate::style::{
    band_boxes, check_range, draw_labels, error_bars, markers, syst_boxes, tab10, x_bars, FONT,
};

// external crates
use hfxs_hist::{Graph, Store};
use log::{debug, info};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

/// Everything needed to draw a comparison figure
///
/// ```yaml
/// output: figures/b0_vs_theory.svg
/// x_range: [0.0, 23.5]
/// y_range: [2.0e-2, 3.0e+2]
/// x_title: "pT (GeV/c)"
/// y_title: "d2σ/dpTdy (μb GeV-1 c)"
/// labels: ["ALICE", "pp collisions, √s = 13.6 TeV", "|y| < 0.5"]
/// measurement:
///   file: cross_section.json
///   stat: h_stat
///   syst: h_syst
///   scale: 1.0e-6
/// predictions:
///   - { file: fonll.json, graph: gBhadrNNPDF30, label: FONLL, color: 0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    pub output: PathBuf,
    /// Canvas width and height in pixels
    #[serde(default = "default_size")]
    pub size: [u32; 2],
    pub x_range: [f64; 2],
    /// Spectrum range, drawn on a logarithmic axis
    pub y_range: [f64; 2],
    /// Range of every ratio panel
    #[serde(default = "default_ratio_range")]
    pub ratio_range: [f64; 2],
    #[serde(default)]
    pub x_title: String,
    #[serde(default)]
    pub y_title: String,
    /// Lines of text in the top left of the spectrum
    #[serde(default)]
    pub labels: Vec<String>,
    pub measurement: Measurement,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub predictions: Vec<PredictionBand>,
}

/// The measured spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub file: PathBuf,
    /// Histogram with statistical uncertainties
    pub stat: String,
    /// Histogram with systematic uncertainties
    pub syst: String,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    #[serde(default = "default_data_label")]
    pub label: String,
}

/// A measurement by another experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub file: PathBuf,
    pub stat: String,
    #[serde(default)]
    pub syst: Option<String>,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    pub label: String,
    /// Index in the `tab10` palette
    #[serde(default)]
    pub color: usize,
    /// Only points with x within these limits are drawn
    #[serde(default)]
    pub x_min: Option<f64>,
    #[serde(default)]
    pub x_max: Option<f64>,
}

/// A theory prediction drawn as a band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionBand {
    pub file: PathBuf,
    pub graph: String,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    pub label: String,
    #[serde(default)]
    pub color: usize,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_size() -> [u32; 2] {
    [1200, 800]
}

fn default_ratio_range() -> [f64; 2] {
    [0.0, 3.0]
}

fn unit_scale() -> f64 {
    1.0
}

fn default_data_label() -> String {
    "Data".to_string()
}

fn default_alpha() -> f64 {
    0.5
}

impl ComparisonConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_yaml::from_reader(reader)?)
    }
}

/// Graphs loaded and scaled from the stores named in a [ComparisonConfig]
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonData {
    pub stat: Graph,
    pub syst: Graph,
    /// Statistical and optional systematic graphs of each reference
    pub references: Vec<(Graph, Option<Graph>)>,
    pub predictions: Vec<Graph>,
}

fn scaled(store: &Store, key: &str, scale: f64) -> Result<Graph> {
    let mut graph = store.get_graph(key)?;
    graph.scale(scale);
    Ok(graph)
}

impl ComparisonData {
    /// Read every input, applying scales and x filters
    pub fn load(config: &ComparisonConfig) -> Result<Self> {
        let m = &config.measurement;
        let store = Store::read(&m.file)?;
        let stat = scaled(&store, &m.stat, m.scale)?;
        let syst = scaled(&store, &m.syst, m.scale)?;

        let mut references = Vec::with_capacity(config.references.len());
        for r in &config.references {
            let store = Store::read(&r.file)?;
            let keep =
                |x: f64| r.x_min.map_or(true, |lo| x >= lo) && r.x_max.map_or(true, |hi| x <= hi);
            let stat = scaled(&store, &r.stat, r.scale)?.filter_x(keep);
            let syst = match &r.syst {
                Some(key) => Some(scaled(&store, key, r.scale)?.filter_x(keep)),
                None => None,
            };
            references.push((stat, syst));
        }

        let predictions = config
            .predictions
            .iter()
            .map(|p| scaled(&Store::read(&p.file)?, &p.graph, p.scale))
            .collect::<Result<Vec<Graph>>>()?;

        debug!(
            "Loaded {} references and {} predictions",
            references.len(),
            predictions.len()
        );
        Ok(Self {
            stat,
            syst,
            references,
            predictions,
        })
    }
}

/// Load the inputs and draw the figure to `config.output`
pub fn comparison_figure(config: &ComparisonConfig) -> Result<PathBuf> {
    let data = ComparisonData::load(config)?;
    draw_comparison(config, &data)?;
    Ok(config.output.clone())
}

/// Spectrum on the left, one data over prediction panel per prediction on the right
pub fn draw_comparison(config: &ComparisonConfig, data: &ComparisonData) -> Result<()> {
    check_range("x", config.x_range, false)?;
    check_range("y", config.y_range, true)?;
    check_range("ratio", config.ratio_range, false)?;

    if let Some(parent) = config.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let root =
        SVGBackend::new(&config.output, (config.size[0], config.size[1])).into_drawing_area();
    root.fill(&WHITE)?;

    let halves = root.split_evenly((1, 2));
    draw_spectrum(&halves[0], config, data)?;
    if !data.predictions.is_empty() {
        let panels = halves[1].split_evenly((data.predictions.len(), 1));
        for (i, panel) in panels.iter().enumerate() {
            let last = i + 1 == panels.len();
            draw_ratio(panel, config, data, i, last)?;
        }
    }

    root.present()?;
    info!("Comparison figure written to {}", config.output.display());
    Ok(())
}

fn draw_spectrum<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    config: &ComparisonConfig,
    data: &ComparisonData,
) -> Result<()> {
    let [x_lo, x_hi] = config.x_range;
    let [y_lo, y_hi] = config.y_range;
    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_lo..x_hi, (y_lo..y_hi).log_scale())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(config.x_title.as_str())
        .y_desc(config.y_title.as_str())
        .label_style((FONT, 16))
        .draw()?;

    for (prediction, band) in config.predictions.iter().zip(&data.predictions) {
        let color = tab10(prediction.color);
        chart
            .draw_series(band_boxes(band, color, prediction.alpha, y_lo))?
            .label(prediction.label.as_str())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 6), (x + 20, y + 6)], color.mix(0.7).filled())
            });
    }

    for (reference, (stat, syst)) in config.references.iter().zip(&data.references) {
        let color = tab10(reference.color);
        if let Some(syst) = syst {
            chart.draw_series(syst_boxes(syst, color, y_lo))?;
        }
        chart.draw_series(error_bars(stat, color, y_lo))?;
        chart
            .draw_series(markers(stat, color, 4, y_lo))?
            .label(reference.label.as_str())
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
    }

    chart.draw_series(syst_boxes(&data.syst, BLACK, y_lo))?;
    chart.draw_series(error_bars(&data.stat, BLACK, y_lo))?;
    chart
        .draw_series(markers(&data.stat, BLACK, 5, y_lo))?
        .label(config.measurement.label.as_str())
        .legend(|(x, y)| Circle::new((x + 10, y), 5, BLACK.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 16))
        .border_style(TRANSPARENT)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    draw_labels(area, &config.labels, (100, 30), 18)
}

fn draw_ratio<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    config: &ComparisonConfig,
    data: &ComparisonData,
    index: usize,
    with_x_title: bool,
) -> Result<()> {
    let prediction = &config.predictions[index];
    let band = &data.predictions[index];
    let color = tab10(prediction.color);
    let [x_lo, x_hi] = config.x_range;
    let [r_lo, r_hi] = config.ratio_range;

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(if with_x_title { 45 } else { 25 })
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, r_lo..r_hi)?;

    let x_title = if with_x_title { config.x_title.as_str() } else { "" };
    let y_title = format!("Data / {}", prediction.label);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(x_title)
        .y_desc(y_title.as_str())
        .label_style((FONT, 14))
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        vec![(x_lo, 1.0), (x_hi, 1.0)],
        BLACK.mix(0.4),
    )))?;
    chart.draw_series(band_boxes(&band.relative_band(), color, prediction.alpha, r_lo))?;

    let stat = data.stat.ratio_to(band)?;
    let syst = data.syst.ratio_to(band)?;
    chart.draw_series(syst_boxes(&syst, BLACK, r_lo))?;
    chart.draw_series(error_bars(&stat, BLACK, r_lo))?;
    chart.draw_series(x_bars(&stat, BLACK, r_lo))?;
    chart.draw_series(markers(&stat, BLACK, 4, r_lo))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let text = "
output: out.svg
x_range: [0, 20]
y_range: [0.01, 100]
measurement: { file: xsec.json, stat: h_stat, syst: h_syst }
predictions:
  - { file: fonll.json, graph: g_fonll, label: FONLL }
";
        let config: ComparisonConfig = serde_yaml::from_str(text).unwrap();
        assert_eq!(config.size, [1200, 800]);
        assert_eq!(config.ratio_range, [0.0, 3.0]);
        assert_eq!(config.measurement.label, "Data");
        assert_eq!(config.measurement.scale, 1.0);
        assert_eq!(config.predictions[0].alpha, 0.5);
        assert_eq!(config.predictions[0].color, 0);
        assert!(config.references.is_empty());
    }
}
