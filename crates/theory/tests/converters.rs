//! Converters reading real file layouts

use approx::assert_relative_eq;
use hfxs_theory::{convert_model, convert_nnlo_nnll, ratio_file_name, Error, Model, NnloBinning};
use rstest::{fixture, rstest};
use std::path::Path;

fn write(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).unwrap();
}

/// Seven pT rows of `central err_low err_high`
fn seven_rows(scale: f64) -> String {
    (1..=7)
        .map(|i| {
            let central = scale / i as f64;
            format!("{:.3} {:.3} {:.3}\n", central, -0.1 * central, 0.2 * central)
        })
        .collect()
}

#[fixture]
fn nnlo_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ALICE_histogram.dat", &format!("# dsigma/dpT\n{}", seven_rows(100.0)));
    for window in NnloBinning::default().rapidity_windows {
        write(dir.path(), &ratio_file_name(window), &seven_rows(2.0));
    }
    write(dir.path(), "ALICE_extrapolation.dat", "1.62 -0.11 0.19\n");
    dir
}

#[rstest]
fn nnlo_objects(nnlo_dir: tempfile::TempDir) {
    let store = convert_nnlo_nnll(nnlo_dir.path(), &NnloBinning::default()).unwrap();

    for key in [
        "h_cross_sec",
        "g_cross_sec",
        "h_rap_ratio_2_2.5",
        "g_rap_ratio_3_3.5",
        "h_rap_ratio_4_4.5",
        "h_extrap",
        "g_extrap",
    ] {
        assert!(store.contains(key), "missing {key}");
    }

    let h = store.get_hist("h_cross_sec").unwrap();
    assert_eq!(h.edges, NnloBinning::default().pt_edges);
    assert_eq!(h.contents[0], 100.0);

    let g = store.get_graph("g_cross_sec").unwrap();
    assert_eq!(g.points[0].eyl, 10.0);
    assert_eq!(g.points[0].eyh, 20.0);

    let extrap = store.get_graph("g_extrap").unwrap();
    assert_eq!(extrap.points[0].y, 1.62);
    assert_eq!(extrap.points[0].eyl, 0.11);
}

#[rstest]
fn nnlo_row_count_checked(nnlo_dir: tempfile::TempDir) {
    write(nnlo_dir.path(), "ALICE_histogram.dat", "1 -0.1 0.1\n");
    match convert_nnlo_nnll(nnlo_dir.path(), &NnloBinning::default()) {
        Err(Error::RowCount { file, expected, found }) => {
            assert_eq!(file, "ALICE_histogram.dat");
            assert_eq!((expected, found), (7, 1));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[rstest]
#[case(Model::Gmvfns, "pT cen min max\n1 10 8 13\n2 5 4 6\n3 2 1.5 2.5\n4 1 0.8 1.3\n", false)]
#[case(Model::KtFactorisation, "# ptmin ptmax central lower upper\n1 2 10 8 13\n2 3 5 4 6\n", true)]
fn model_bands(#[case] model: Model, #[case] text: &str, #[case] binned: bool) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "model.txt", text);

    let store = convert_model(dir.path().join("model.txt"), model, "g_model").unwrap();
    let g = store.get_graph("g_model").unwrap();
    assert_eq!(g.points[0].y, 10.0);
    assert_eq!(g.points[0].eyl, 2.0);
    assert_eq!(g.points[0].eyh, 3.0);
    assert_eq!(store.contains("h_model"), binned);
}

#[test]
fn fonll_spline_between_points() {
    let dir = tempfile::tempdir().unwrap();
    // exponential falloff sampled every GeV
    let text = (0..10)
        .map(|i| format!("{}.0 {} {} {}\n", i, (-0.5 * i as f64).exp(), 0.0, 0.0))
        .collect::<String>();
    write(dir.path(), "fonll.txt", &format!("# pt central min max\n{text}"));

    let prediction = Model::Fonll { pt_differential: true }
        .read(dir.path().join("fonll.txt"))
        .unwrap();
    let splines = prediction.splines().unwrap().unwrap();

    assert!(splines.min.is_none());
    assert_relative_eq!(splines.central.eval(4.5), (-2.25_f64).exp(), max_relative = 5e-3);
}
