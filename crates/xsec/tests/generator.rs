//! Generator runs read from disk

use approx::assert_relative_eq;
use hfxs_hist::{Hist1D, Store};
use hfxs_xsec::{generator_cross_section_from_config, Error, GeneratorConfig};
use rstest::rstest;
use std::path::Path;

fn write_run(
    dir: &Path,
    stem: &str,
    sigma_gen: f64,
    n_accepted: f64,
    rows: &[(i32, f64, f64)],
    ext: &str,
) {
    let mut store = Store::new();
    store.insert(
        "hSigmaGen",
        Hist1D::with_values("hSigmaGen", vec![0.0, 1.0], vec![sigma_gen], vec![0.0]).unwrap(),
    );
    store.insert(
        "hAcceptedEvents",
        Hist1D::with_values("hAcceptedEvents", vec![0.0, 1.0], vec![n_accepted], vec![0.0])
            .unwrap(),
    );
    store.write(dir.join(format!("{stem}.{ext}"))).unwrap();

    let mut text = String::from("pdg,pt,y\n");
    for (pdg, pt, y) in rows {
        text.push_str(&format!("{pdg},{pt},{y}\n"));
    }
    std::fs::write(dir.join(format!("{stem}.csv")), text).unwrap();
}

fn config(folder: &Path) -> GeneratorConfig {
    serde_yaml::from_str(&format!(
        "inputs: {{folder: {0}, mode: monash}}
pt: {{mins: [0, 2], maxs: [2, 6]}}
output: {0}/out.json
",
        folder.display()
    ))
    .unwrap()
}

#[rstest]
#[case("json")]
#[case("bin")]
fn runs_are_combined(#[case] ext: &str) {
    let dir = tempfile::tempdir().unwrap();
    let mode = dir.path().join("monash");
    std::fs::create_dir_all(&mode).unwrap();

    let rows = [(511, 1.0, 0.0), (-511, 3.0, 0.2), (511, 5.0, -0.4), (511, 5.0, 0.6)];
    write_run(&mode, "b0_seed1", 60.0, 400.0, &rows, ext);
    write_run(&mode, "b0_seed2", 40.0, 600.0, &rows[..1], ext);

    // an orphaned table has no store and is skipped
    std::fs::write(mode.join("b0_seed3.csv"), "pdg,pt,y\n511,1.0,0.0\n").unwrap();

    let hist = generator_cross_section_from_config(&config(dir.path())).unwrap();

    // mean sigma 50 mb, 1000 accepted events
    let norm = 50.0 / 1000.0 * 1e3 / 2.0;
    assert_relative_eq!(hist.contents[0], 2.0 * norm / 2.0, max_relative = 1e-12);
    assert_relative_eq!(hist.contents[1], 2.0 * norm / 4.0, max_relative = 1e-12);
    assert_relative_eq!(hist.errors[1], 2.0_f64.sqrt() * norm / 4.0, max_relative = 1e-12);

    let written = Store::read(dir.path().join("out.json")).unwrap();
    assert_eq!(written.get_hist("hCrossSection").unwrap(), &hist);
}

#[test]
fn nothing_to_read() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        generator_cross_section_from_config(&config(dir.path())),
        Err(Error::NoGeneratorRuns { .. })
    ));
}
