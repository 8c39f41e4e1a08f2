//! Named object container and its file formats

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::hist::Hist1D;

// external crates
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Anything that can be kept in a [Store]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Object {
    Hist(Hist1D),
    Graph(Graph),
}

impl Object {
    /// Name of the contained object
    pub fn name(&self) -> &str {
        match self {
            Object::Hist(h) => &h.name,
            Object::Graph(g) => &g.name,
        }
    }
}

impl From<Hist1D> for Object {
    fn from(hist: Hist1D) -> Self {
        Object::Hist(hist)
    }
}

impl From<Graph> for Object {
    fn from(graph: Graph) -> Self {
        Object::Graph(graph)
    }
}

/// Container of histograms and graphs keyed by path
///
/// Keys are `/` separated like a directory tree, e.g. `"visible/h_stat_vis"`.
/// Objects are kept sorted by key so that files are reproducible.
///
/// ```rust
/// # use hfxs_hist::{Graph, Hist1D, Store};
/// let mut store = Store::new();
/// store.insert("h_stat", Hist1D::new("h_stat", vec![0.0, 1.0]).unwrap());
///
/// // histograms may always be requested as graphs
/// let graph = store.get_graph("h_stat").unwrap();
/// assert_eq!(graph.len(), 1);
///
/// // but not the other way around
/// store.insert("g", Graph::default());
/// assert!(store.get_hist("g").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    objects: BTreeMap<String, Object>,
}

impl Store {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a store file
    ///
    /// Files ending in `.json` are parsed as JSON, anything else is expected
    /// to be the binary format.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading store {}", path.display());
        let reader = BufReader::new(File::open(path)?);

        let store: Store = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            bincode::deserialize_from(reader)?
        };

        trace!("{} objects read from {}", store.len(), path.display());
        Ok(store)
    }

    /// Write the store to a file, format chosen by extension as for [Store::read]
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("Writing {} objects to {}", self.len(), path.display());
        let mut writer = init_writer(path)?;

        if is_json(path) {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            bincode::serialize_into(&mut writer, self)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Insert an object, replacing anything already under `key`
    pub fn insert<O: Into<Object>>(&mut self, key: &str, object: O) {
        self.objects.insert(key.to_string(), object.into());
    }

    /// Look up any object by key
    pub fn get(&self, key: &str) -> Result<&Object> {
        self.objects.get(key).ok_or_else(|| Error::ObjectNotFound {
            key: key.to_string(),
        })
    }

    /// Look up a histogram by key
    pub fn get_hist(&self, key: &str) -> Result<&Hist1D> {
        match self.get(key)? {
            Object::Hist(h) => Ok(h),
            Object::Graph(_) => Err(Error::WrongObjectType {
                key: key.to_string(),
                expected: "histogram",
            }),
        }
    }

    /// Look up a graph by key, converting histograms with [Graph::from_hist]
    pub fn get_graph(&self, key: &str) -> Result<Graph> {
        match self.get(key)? {
            Object::Hist(h) => Ok(Graph::from_hist(h)),
            Object::Graph(g) => Ok(g.clone()),
        }
    }

    /// True if `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// All keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(|k| k.as_str())
    }

    /// Objects directly or indirectly under `prefix/`, keyed relative to it
    ///
    /// ```rust
    /// # use hfxs_hist::{Hist1D, Store};
    /// let mut store = Store::new();
    /// let h = Hist1D::new("h", vec![0.0, 1.0]).unwrap();
    /// store.insert("visible/a", h.clone());
    /// store.insert("visible/b", h.clone());
    /// store.insert("integrated/a", h);
    ///
    /// let names = store.directory("visible").map(|(k, _)| k).collect::<Vec<_>>();
    /// assert_eq!(names, vec!["a", "b"]);
    /// ```
    pub fn directory<'a>(&'a self, prefix: &str) -> impl Iterator<Item = (&'a str, &'a Object)> {
        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        self.objects
            .iter()
            .filter_map(move |(k, v)| k.strip_prefix(prefix.as_str()).map(|rest| (rest, v)))
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Initialise a writer from anything that can be turned into a path
fn init_writer(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    Ok(BufWriter::new(file))
}
