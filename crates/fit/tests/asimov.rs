//! Fits to noiseless spectra recover the parameters they were built from

use approx::assert_relative_eq;
use hfxs_fit::{
    extract_from_config, BackgroundShape, FitConfig, FitModel, MassFit, MinimiserSettings, Part,
    SignalShape,
};
use hfxs_hist::{Hist1D, Store};
use rstest::{fixture, rstest};
use statrs::distribution::{ContinuousCDF, Normal};
use std::io::Write;

const MASS: f64 = 5.27966;

/// Histogram filled with the exact model expectation
fn asimov(model: &FitModel, truth: &[f64]) -> Hist1D {
    let mut hist = Hist1D::uniform("h_mass", 56, 4.9, 5.66).unwrap();
    hist.contents = model.expected(truth);
    hist
}

fn empty() -> Hist1D {
    Hist1D::uniform("h_mass", 56, 4.9, 5.66).unwrap()
}

#[fixture]
fn gaussian_on_expo() -> (FitModel, Vec<f64>) {
    let model = FitModel::for_hist(&empty(), MASS)
        .with_signal(SignalShape::Gaussian)
        .with_background(BackgroundShape::Expo);
    (model, vec![800.0, 5.281, 0.025, 5000.0, -2.0])
}

#[rstest]
fn recovers_gaussian_on_expo(gaussian_on_expo: (FitModel, Vec<f64>)) {
    let (model, truth) = gaussian_on_expo;
    let fit = MassFit::run("pt2_4", asimov(&model, &truth), model, &MinimiserSettings::default())
        .unwrap();

    assert!(fit.converged());
    let (raw, raw_err) = fit.raw_yield();
    assert_relative_eq!(raw, 800.0, max_relative = 1e-2);
    assert!(raw_err > 0.0 && raw_err < 0.5 * raw);

    let (mean, _) = fit.mean().unwrap();
    assert!((mean - 5.281).abs() < 1e-3);
    let (sigma, _) = fit.sigma().unwrap();
    assert_relative_eq!(sigma, 0.025, max_relative = 2e-2);

    // all of the data is described
    let total = fit.expected(Part::Total).iter().sum::<f64>();
    assert_relative_eq!(total, fit.data.sum(), max_relative = 1e-3);
}

#[rstest]
fn window_quantities(gaussian_on_expo: (FitModel, Vec<f64>)) {
    let (model, truth) = gaussian_on_expo;
    let fit = MassFit::run("pt2_4", asimov(&model, &truth), model, &MinimiserSettings::default())
        .unwrap();

    let (s, b) = fit.window_yields();
    // +/- 3 sigma keeps 99.73% of a Gaussian
    assert_relative_eq!(s, 0.9973 * 800.0, max_relative = 2e-2);
    assert!(b > 0.0 && b < 5000.0);

    let (significance, error) = fit.significance();
    assert_relative_eq!(significance, s / (s + b).sqrt(), max_relative = 1e-9);
    assert!(error > 0.0);

    let (soverb, _) = fit.signal_over_background();
    assert_relative_eq!(soverb, s / b, max_relative = 1e-9);
}

#[rstest]
fn residuals_leave_the_signal(gaussian_on_expo: (FitModel, Vec<f64>)) {
    let (model, truth) = gaussian_on_expo;
    let fit = MassFit::run("pt2_4", asimov(&model, &truth), model, &MinimiserSettings::default())
        .unwrap();

    let residuals = fit.residuals();
    let signal = fit.expected(Part::Signal);
    for (r, s) in residuals.contents.iter().zip(&signal) {
        assert!((r - s).abs() < 0.05 * fit.data.contents.iter().cloned().fold(0.0, f64::max));
    }
    assert_eq!(residuals.name, "h_mass_residuals");

    let curve = fit.curve(200, Part::Total);
    assert_eq!(curve.len(), 200);
    assert_eq!(curve[0].0, 4.9);
    assert!((curve[199].0 - 5.66).abs() < 1e-12);
}

#[rstest]
fn recovers_double_gaussian_without_background() {
    let model = FitModel::for_hist(&empty(), MASS).with_signal(SignalShape::DoubleGaus);
    let truth = [2000.0, 5.279, 0.02, 0.06, 0.7];
    let fit = MassFit::run("pt2_4_MC", asimov(&model, &truth), model, &MinimiserSettings::default())
        .unwrap();

    assert!(fit.converged());
    assert_relative_eq!(fit.raw_yield().0, 2000.0, max_relative = 1e-3);
    assert!((fit.mean().unwrap().0 - 5.279).abs() < 1e-3);
    assert_relative_eq!(fit.sigma().unwrap().0, 0.02, max_relative = 5e-2);
    // no background means no signal over background
    assert_eq!(fit.signal_over_background().0, 0.0);
}

/// Candidates placed at the quantiles of the true shapes
fn write_candidates(path: &std::path::Path, signal: usize, background: usize, mc: bool) {
    let peak = Normal::new(5.28, 0.03).unwrap();
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "fM,fPt,ML_output,fFlagMcMatchRec").unwrap();

    for pt in [3.0, 5.0] {
        for i in 0..signal {
            let q = (i as f64 + 0.5) / signal as f64;
            writeln!(file, "{},{pt},0.9,1", peak.inverse_cdf(q)).unwrap();
        }
        for i in 0..background {
            // flat over the mass window
            let m = 4.9 + 0.76 * (i as f64 + 0.5) / background as f64;
            writeln!(file, "{m},{pt},0.9,4").unwrap();
        }
        // rejected by the classifier cut
        writeln!(file, "5.28,{pt},0.1,1").unwrap();
    }
    if !mc {
        // data carries no match flag
        let text = std::fs::read_to_string(path)
            .unwrap()
            .replace(",1\n", ",\n")
            .replace(",4\n", ",\n");
        std::fs::write(path, text).unwrap();
    }
}

#[rstest]
fn extraction_writes_summary() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.csv");
    let mc = dir.path().join("mc.csv");
    write_candidates(&data, 500, 2000, false);
    write_candidates(&mc, 2000, 500, true);

    let text = format!(
        "
inputs: {{ data: [{}], mc: [{}] }}
selections: {{ pt_mins: [2, 4], pt_maxs: [4, 6], bdt_sel: [0.5, 0.5] }}
fit_configs:
  mass_limits: [[4.9, 5.66], [4.9, 5.66]]
  signal_funcs: [[gaussian], [gaussian]]
  bkg_funcs: [[pol1], [nobkg]]
  use_bkg_templ: [false, true]
outputs: {{ directory: {}, suffix: _test }}
",
        data.display(),
        mc.display(),
        dir.path().join("out").display()
    );
    let config: FitConfig = serde_yaml::from_str(&text).unwrap();

    let (path, extraction) = extract_from_config(&config).unwrap();
    assert_eq!(path, dir.path().join("out/B0_mass_test.json"));
    assert_eq!(extraction.fits.len(), 4);

    let store = Store::read(&path).unwrap();
    for key in [
        "h_rawyields",
        "h_significance",
        "h_soverb",
        "h_means",
        "h_sigmas",
        "h_means_mc",
        "h_sigmas_mc",
        "h_mass_pt2_4",
        "h_mass_pt4_6",
    ] {
        assert!(store.contains(key), "{key}");
    }

    let raw = store.get_hist("h_rawyields").unwrap();
    assert_eq!(raw.edges, vec![2.0, 4.0, 6.0]);
    for content in &raw.contents {
        assert_relative_eq!(*content, 500.0, max_relative = 0.05);
    }

    let means_mc = store.get_hist("h_means_mc").unwrap();
    for content in &means_mc.contents {
        assert!((content - 5.28).abs() < 2e-3);
    }
}
