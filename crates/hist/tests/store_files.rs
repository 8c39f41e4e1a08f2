//! Integration tests for store files

use hfxs_hist::{Error, Graph, Hist1D, Object, Point, Store};
use rstest::{fixture, rstest};

#[fixture]
fn store() -> Store {
    let mut store = Store::new();

    let hist = Hist1D::with_values(
        "h_stat",
        vec![1.0, 2.0, 4.0, 6.0, 8.0, 10.0, 14.0, 23.5],
        vec![310.2, 98.7, 21.3, 6.02, 2.1, 0.61, 0.083],
        vec![12.1, 3.3, 0.91, 0.33, 0.15, 0.05, 0.0091],
    )
    .unwrap()
    .with_title("p_{T} (GeV/c)");
    store.insert("h_stat", hist);

    let graph = Graph::new(
        "g_extrap",
        vec![Point {
            x: 0.5,
            y: 3.417,
            exl: 0.5,
            exh: 0.5,
            eyl: 0.213,
            eyh: 0.305,
        }],
    )
    .unwrap();
    store.insert("integrated/g_extrap", graph);
    store
}

#[rstest]
#[case("store.json")]
#[case("store.bin")]
#[case("nested/dir/store.hfxs")]
fn write_then_read_is_identical(store: Store, #[case] name: &str) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);

    store.write(&path).unwrap();
    let read = Store::read(&path).unwrap();

    assert_eq!(read, store);
}

#[rstest]
fn written_file_is_complete_on_return(store: Store) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.bin");
    store.write(&path).unwrap();

    let expected = bincode::serialize(&store).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), expected);
}

#[rstest]
fn json_is_readable_text(store: Store) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    store.write(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"integrated/g_extrap\""));
    assert!(text.contains("\"h_stat\""));
}

#[rstest]
fn missing_object_names_the_key(store: Store) {
    match store.get_hist("visible/h_stat_vis") {
        Err(Error::ObjectNotFound { key }) => assert_eq!(key, "visible/h_stat_vis"),
        other => panic!("unexpected {other:?}"),
    }
}

#[rstest]
fn hist_requested_as_graph(store: Store) {
    let graph = store.get_graph("h_stat").unwrap();
    let hist = store.get_hist("h_stat").unwrap();

    assert_eq!(graph.len(), hist.nbins());
    assert_eq!(graph.points[6].x, 18.75);
    assert_eq!(graph.points[6].exl, 4.75);
    assert_eq!(graph.points[6].eyh, 0.0091);
}

#[rstest]
fn directory_listing(store: Store) {
    let listed = store.directory("integrated").collect::<Vec<_>>();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].0, "g_extrap");
    assert!(matches!(listed[0].1, Object::Graph(_)));
}

#[test]
fn unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(Store::read(&path), Err(Error::JSONError(_))));
    assert!(matches!(
        Store::read(dir.path().join("absent.bin")),
        Err(Error::IOError(_))
    ));
}
