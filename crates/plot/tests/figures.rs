//! Figures are written from stores and fits

use std::fs;
use std::path::Path;

use hfxs_fit::{BackgroundShape, FitModel, MassFit, MinimiserSettings, SignalShape};
use hfxs_hist::{Graph, Hist1D, Point, Store};
use hfxs_plot::{
    comparison_figure, efficiency_figure, mass_fit_figure, residual_figure, ComparisonConfig,
    Error, Measurement, Particle, PredictionBand, Reference,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

#[fixture]
fn dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn svg(path: &Path) -> String {
    let text = fs::read_to_string(path).unwrap();
    assert!(text.contains("<svg"), "{} is not an SVG", path.display());
    text
}

fn spectrum(name: &str, scale: f64) -> Hist1D {
    let edges = vec![1.0, 2.0, 4.0, 6.0, 10.0];
    let contents = [40.0, 20.0, 6.0, 1.5].map(|c| c * scale).to_vec();
    let errors = contents.iter().map(|c| 0.1 * c).collect();
    Hist1D::with_values(name, edges, contents, errors).unwrap()
}

fn comparison_inputs(dir: &TempDir) -> ComparisonConfig {
    let mut data = Store::new();
    data.insert("h_stat", spectrum("h_stat", 1.0e6));
    data.insert("h_syst", spectrum("h_syst", 1.0e6));
    data.write(dir.path().join("xsec.json")).unwrap();

    let mut theory = Store::new();
    let mut band = Graph::from_hist(&spectrum("g_fonll", 0.8));
    for p in band.points.iter_mut() {
        p.eyl = 0.3 * p.y;
        p.eyh = 0.5 * p.y;
    }
    theory.insert("g_fonll", band);
    theory.insert(
        "g_other",
        Graph::new(
            "g_other",
            vec![
                Point::symmetric(3.0, 25.0, 1.0, 3.0),
                Point::symmetric(12.0, 1.0, 2.0, 0.2),
            ],
        )
            .unwrap(),
    );
    theory.write(dir.path().join("theory.json")).unwrap();

    ComparisonConfig {
        output: dir.path().join("figures/compare.svg"),
        size: [1000, 600],
        x_range: [0.0, 12.0],
        y_range: [0.1, 100.0],
        ratio_range: [0.0, 3.0],
        x_title: "pT (GeV/c)".to_string(),
        y_title: "d2σ/dpTdy (μb GeV-1 c)".to_string(),
        labels: vec!["pp collisions".to_string()],
        measurement: Measurement {
            file: dir.path().join("xsec.json"),
            stat: "h_stat".to_string(),
            syst: "h_syst".to_string(),
            scale: 1.0e-6,
            label: "Data".to_string(),
        },
        references: vec![Reference {
            file: dir.path().join("theory.json"),
            stat: "g_other".to_string(),
            syst: None,
            scale: 1.0,
            label: "Other experiment".to_string(),
            color: 3,
            x_min: None,
            x_max: Some(10.0),
        }],
        predictions: vec![PredictionBand {
            file: dir.path().join("theory.json"),
            graph: "g_fonll".to_string(),
            scale: 1.0e-6,
            label: "FONLL".to_string(),
            color: 0,
            alpha: 0.5,
        }],
    }
}

#[rstest]
fn comparison_with_ratio_panel(dir: TempDir) {
    let config = comparison_inputs(&dir);
    let output = comparison_figure(&config).unwrap();
    assert_eq!(output, dir.path().join("figures/compare.svg"));
    assert!(svg(&output).contains("FONLL"));
}

#[rstest]
fn log_axis_needs_positive_range(dir: TempDir) {
    let mut config = comparison_inputs(&dir);
    config.y_range = [0.0, 100.0];
    assert!(matches!(
        comparison_figure(&config),
        Err(Error::InvalidRange { axis: "y", .. })
    ));
}

#[rstest]
fn missing_prediction_is_reported(dir: TempDir) {
    let mut config = comparison_inputs(&dir);
    config.predictions[0].graph = "g_missing".to_string();
    assert!(matches!(comparison_figure(&config), Err(Error::HistError(_))));
}

#[rstest]
fn efficiency(dir: TempDir) {
    let edges = vec![1.0, 2.0, 4.0, 8.0, 24.0];
    let mut store = Store::new();
    store.insert(
        "h_acc",
        Hist1D::with_values("h_acc", edges.clone(), vec![0.6, 0.7, 0.8, 0.9], vec![0.01; 4])
            .unwrap(),
    );
    store.insert(
        "h_eff",
        Hist1D::with_values(
            "h_eff",
            edges,
            vec![0.0, 0.01, 0.05, 0.2],
            vec![0.0, 0.001, 0.004, 0.01],
        )
            .unwrap(),
    );

    let output = dir.path().join("efficiency.svg");
    efficiency_figure(&store, &output, Particle::B0).unwrap();
    assert!(svg(&output).contains("charge conjugate"));

    // both histograms are required
    let mut partial = Store::new();
    partial.insert("h_acc", store.get_hist("h_acc").unwrap().clone());
    assert!(efficiency_figure(&partial, &output, Particle::Bplus).is_err());
}

#[rstest]
fn mass_fit_and_residuals(dir: TempDir) {
    let mut hist = Hist1D::uniform("h_mass", 56, 4.9, 5.66).unwrap();
    let model = FitModel::for_hist(&hist, 5.27966)
        .with_signal(SignalShape::Gaussian)
        .with_background(BackgroundShape::Expo);
    hist.contents = model.expected(&[600.0, 5.28, 0.03, 4000.0, -2.0]);
    hist.errors = hist.contents.iter().map(|c| c.sqrt()).collect();

    let fit = MassFit::run("pt2_4", hist, model, &MinimiserSettings::default()).unwrap();

    let mass = dir.path().join("B0_mass_pt2_4.svg");
    let residuals = dir.path().join("B0_massres_pt2_4.svg");
    mass_fit_figure(&fit, &mass).unwrap();
    residual_figure(&fit, &residuals).unwrap();

    assert!(svg(&mass).contains("Total fit"));
    assert!(svg(&residuals).contains("Data - background"));
}
