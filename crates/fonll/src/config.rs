//! Form settings and the list of predictions to request

// standard library
use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

// crate modules
use crate::error::{Error, Result};

// external crates
use log::info;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Everything needed to harvest a set of predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FonllConfig {
    /// Address of the form page
    pub fonll_url: String,
    /// Address the form posts to, the form page itself if not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_action: Option<String>,
    pub output_dir: PathBuf,
    /// Seconds allowed for fetching a result file
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: u64,
    /// Seconds between predictions in sequential mode
    #[serde(default = "default_delay")]
    pub delay_between_predictions: u64,
    /// Seconds allowed for the calculation behind a submission
    #[serde(default = "default_download_wait_time")]
    pub download_wait_time: u64,
    /// Worker threads in parallel mode, `min(4, predictions)` if not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
    #[serde(default = "default_parallel_mode")]
    pub parallel_mode: bool,
    /// Address to also receive the results by email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub predictions: Vec<Prediction>,
}

/// One filled-in form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<Field>,
}

/// Kinds of form controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Input,
    Select,
    Radio,
    Checkbox,
}

/// A single form control and the value to give it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "type")]
    pub kind: FieldType,
    /// Name attribute of the control
    pub selector: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Field {
    pub fn new(kind: FieldType, selector: &str, value: &str) -> Self {
        Self {
            kind,
            selector: selector.to_string(),
            value: Value::String(value.to_string()),
            description: None,
        }
    }

    /// The value as submitted, `None` for an unticked checkbox
    ///
    /// ```rust
    /// # use hfxs_fonll::{Field, FieldType};
    /// let ptmin = Field::new(FieldType::Input, "ptmin", "2.5");
    /// assert_eq!(ptmin.form_value(), Some("2.5".to_string()));
    /// let nnpdf = Field::new(FieldType::Checkbox, "nnpdf", "1");
    /// assert_eq!(nnpdf.form_value(), Some("1".to_string()));
    /// assert_eq!(Field::new(FieldType::Checkbox, "nnpdf", "").form_value(), None);
    /// ```
    pub fn form_value(&self) -> Option<String> {
        let text = match &self.value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => match self.kind {
                FieldType::Checkbox => "1".to_string(),
                _ => b.to_string(),
            },
            Value::Null => String::new(),
            other => serde_yaml::to_string(other)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        };

        if self.kind == FieldType::Checkbox && !truthy(&self.value) {
            return None;
        }
        Some(text)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Null => false,
        _ => true,
    }
}

impl FonllConfig {
    /// Read from a YAML file and check the required settings
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Write to a YAML file
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        Ok(serde_yaml::to_writer(writer, self)?)
    }

    /// The form address and at least one prediction are needed
    pub fn validate(&self) -> Result<()> {
        if self.fonll_url.trim().is_empty() {
            return Err(Error::MissingSetting { name: "fonll_url" });
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::MissingSetting { name: "output_dir" });
        }
        if self.predictions.is_empty() {
            return Err(Error::MissingSetting {
                name: "predictions",
            });
        }
        Ok(())
    }

    /// Number of worker threads in parallel mode
    pub fn workers(&self) -> usize {
        let n = self.predictions.len();
        self.max_workers.unwrap_or(4).min(n).max(1)
    }

    /// Address the forms are posted to
    pub fn action_url(&self) -> &str {
        self.form_action.as_deref().unwrap_or(&self.fonll_url)
    }

    /// Append a copy of every prediction for each pair of intervals
    ///
    /// Copies are named `{name}_pt{a}-{b}_y{c}-{d}` and have their `ptmin`,
    /// `ptmax`, `ymin` and `ymax` fields replaced. The originals are kept.
    /// Bounds are written as they display, so a [Bound] parsed from `"4.0"`
    /// keeps its decimal point.
    ///
    /// ```rust
    /// # use hfxs_fonll::{Bound, FonllConfig};
    /// let mut config = FonllConfig::sample();
    /// let n = config.predictions.len();
    ///
    /// config.expand(&[(0.0, 0.5), (0.5, 1.0)], &[(4.0, 4.5)]);
    /// assert_eq!(config.predictions.len(), 3 * n);
    /// assert_eq!(config.predictions[n].name, "charm_7tev_central_pt0-0.5_y4-4.5");
    ///
    /// let y: (Bound, Bound) = ("4.0".parse().unwrap(), "4.5".parse().unwrap());
    /// let pt: (Bound, Bound) = ("0".parse().unwrap(), "0.5".parse().unwrap());
    /// config.expand(&[pt], &[y]);
    /// assert_eq!(config.predictions[3 * n].name, "charm_7tev_central_pt0-0.5_y4.0-4.5");
    /// ```
    pub fn expand<B: fmt::Display>(&mut self, pt_intervals: &[(B, B)], y_intervals: &[(B, B)]) {
        let originals = self.predictions.len();
        let mut expanded = Vec::new();
        for prediction in &self.predictions[..originals] {
            for (pt_min, pt_max) in pt_intervals {
                for (y_min, y_max) in y_intervals {
                    let mut copy = prediction.clone();
                    copy.name = format!("{}_pt{pt_min}-{pt_max}_y{y_min}-{y_max}", prediction.name);
                    copy.description = format!(
                        "{} (pt=[{pt_min},{pt_max}], y=[{y_min},{y_max}])",
                        prediction.description
                    );
                    for field in copy.fields.iter_mut() {
                        let value = match field.selector.as_str() {
                            "ptmin" => pt_min,
                            "ptmax" => pt_max,
                            "ymin" => y_min,
                            "ymax" => y_max,
                            _ => continue,
                        };
                        field.value = Value::String(value.to_string());
                    }
                    expanded.push(copy);
                }
            }
        }
        info!("Added {} predictions", expanded.len());
        self.predictions.extend(expanded);
    }

    /// A documented example with three typical requests
    pub fn sample() -> Self {
        Self {
            fonll_url: "http://www.lpthe.jussieu.fr/~cacciari/fonll/fonllform.html".to_string(),
            form_action: None,
            output_dir: PathBuf::from("./fonll_results"),
            wait_timeout: 15,
            delay_between_predictions: 3,
            download_wait_time: 30,
            max_workers: Some(4),
            parallel_mode: true,
            email: None,
            predictions: vec![
                request(
                    "charm_7tev_central",
                    "Charm production at 7 TeV, central rapidity",
                    "7000",
                    "charm",
                    ["0", "50"],
                    ["-0.5", "4.5"],
                    "FONLL-C",
                ),
                request(
                    "charm_13tev_mid_rapidity",
                    "Charm production at 13 TeV, mid rapidity",
                    "13000",
                    "charm",
                    ["1", "30"],
                    ["-1.0", "1.0"],
                    "FONLL-B",
                ),
                request(
                    "bottom_8tev_central",
                    "Bottom production at 8 TeV, central rapidity",
                    "8000",
                    "bottom",
                    ["3", "60"],
                    ["-0.8", "0.8"],
                    "FONLL-C",
                ),
            ],
        }
    }
}

fn request(
    name: &str,
    description: &str,
    energy: &str,
    quark: &str,
    pt: [&str; 2],
    y: [&str; 2],
    scheme: &str,
) -> Prediction {
    Prediction {
        name: name.to_string(),
        description: description.to_string(),
        fields: vec![
            Field::new(FieldType::Select, "energy", energy),
            Field::new(FieldType::Radio, "quark", quark),
            Field::new(FieldType::Input, "ptmin", pt[0]),
            Field::new(FieldType::Input, "ptmax", pt[1]),
            Field::new(FieldType::Input, "ymin", y[0]),
            Field::new(FieldType::Input, "ymax", y[1]),
            Field::new(FieldType::Select, "scheme", scheme),
        ],
    }
}

/// An interval bound that remembers how it was written
///
/// Parsing checks the text is a number, display gives the text back, so
/// `"4.0"` stays `4.0` in prediction names and form fields.
///
/// ```rust
/// # use hfxs_fonll::Bound;
/// let bound: Bound = " 4.0".parse().unwrap();
/// assert_eq!(bound.value(), 4.0);
/// assert_eq!(bound.to_string(), "4.0");
/// assert!("four".parse::<Bound>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    value: f64,
    text: String,
}

impl Bound {
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl FromStr for Bound {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Self {
                value,
                text: text.to_string(),
            }),
            _ => Err(Error::InvalidBound {
                text: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Self {
            value,
            text: value.to_string(),
        }
    }
}

/// Write the example configuration, to be adjusted to the live form
pub fn sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
    FonllConfig::sample().write(path.as_ref())?;
    info!("Sample configuration written to {}", path.as_ref().display());
    Ok(())
}

fn default_wait_timeout() -> u64 {
    10
}

fn default_delay() -> u64 {
    2
}

fn default_download_wait_time() -> u64 {
    30
}

fn default_parallel_mode() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let text = "
fonll_url: http://example.org/form.html
output_dir: out
predictions:
  - name: a
    fields:
      - { type: input, selector: ptmin, value: 2 }
      - { type: checkbox, selector: email, value: false }
";
        let config: FonllConfig = serde_yaml::from_str(text).unwrap();
        config.validate().unwrap();

        assert_eq!(config.wait_timeout, 10);
        assert_eq!(config.delay_between_predictions, 2);
        assert_eq!(config.download_wait_time, 30);
        assert!(config.parallel_mode);
        assert_eq!(config.workers(), 1);
        assert_eq!(config.action_url(), "http://example.org/form.html");

        let fields = &config.predictions[0].fields;
        assert_eq!(fields[0].form_value(), Some("2".to_string()));
        assert_eq!(fields[1].form_value(), None);
    }

    #[test]
    fn missing_settings() {
        let no_url = "output_dir: out\npredictions: []\n";
        assert!(serde_yaml::from_str::<FonllConfig>(no_url).is_err());

        let mut config = FonllConfig::sample();
        config.predictions.clear();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingSetting {
                name: "predictions"
            })
        ));
    }

    #[test]
    fn expansion_rewrites_ranges() {
        let mut config = FonllConfig::sample();
        config.predictions.truncate(1);
        config.expand(&[(10.5, 11.5)], &[(2.0, 2.5), (-0.5, 0.5)]);

        assert_eq!(config.predictions.len(), 3);
        let copy = &config.predictions[2];
        assert_eq!(copy.name, "charm_7tev_central_pt10.5-11.5_y-0.5-0.5");
        assert!(copy.description.ends_with("(pt=[10.5,11.5], y=[-0.5,0.5])"));

        let value = |selector: &str| {
            copy.fields
                .iter()
                .find(|f| f.selector == selector)
                .and_then(|f| f.form_value())
        };
        assert_eq!(value("ptmin").as_deref(), Some("10.5"));
        assert_eq!(value("ymax").as_deref(), Some("0.5"));
        assert_eq!(value("energy").as_deref(), Some("7000"));

        // originals are untouched
        assert_eq!(config.predictions[0].name, "charm_7tev_central");
    }

    #[test]
    fn expansion_keeps_typed_bounds() {
        let mut config = FonllConfig::sample();
        config.predictions.truncate(1);
        let bound = |s: &str| s.parse::<Bound>().unwrap();
        config.expand(&[(bound("0"), bound("0.5"))], &[(bound("4.0"), bound("4.5"))]);

        let copy = &config.predictions[1];
        assert_eq!(copy.name, "charm_7tev_central_pt0-0.5_y4.0-4.5");
        assert!(copy.description.ends_with("(pt=[0,0.5], y=[4.0,4.5])"));
        let ymin = copy.fields.iter().find(|f| f.selector == "ymin");
        assert_eq!(ymin.and_then(|f| f.form_value()).as_deref(), Some("4.0"));
    }

    #[test]
    fn sample_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fonll.yaml");
        sample_config(&path).unwrap();
        assert_eq!(FonllConfig::from_file(&path).unwrap(), FonllConfig::sample());
    }
}
