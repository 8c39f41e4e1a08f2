//! Submitting predictions and collecting their result files

// standard library
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// crate modules
use crate::client::{FormClient, HttpClient};
use crate::config::{FonllConfig, Prediction};
use crate::error::{Error, Result};
use crate::page::{file_name, form_pairs, pre_block, resolve_link, result_links};

// external crates
use kdam::par_tqdm;
use log::{debug, error, info, warn};
use rayon::prelude::*;

/// Outcome of a single prediction
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    pub name: String,
    pub success: bool,
    /// Reason for a failure, with its cause
    pub error: Option<String>,
    /// Result files written to the output directory
    pub files: Vec<PathBuf>,
    /// Wall time spent on the prediction
    pub seconds: f64,
}

/// Totals over a run
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_time: f64,
    pub results: Vec<ProcessingResult>,
}

impl Summary {
    fn new(results: Vec<ProcessingResult>, total_time: f64) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            total_time,
            results,
        }
    }

    /// Names of the predictions that failed
    pub fn failed_names(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.name.as_str())
            .collect()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rate = match self.total {
            0 => 0.0,
            n => 100.0 * self.successful as f64 / n as f64,
        };
        writeln!(
            f,
            "{}/{} predictions successful ({rate:.1}%) in {:.1} s",
            self.successful, self.total, self.total_time
        )?;
        for r in &self.results {
            match &r.error {
                None => writeln!(
                    f,
                    "  ok     {} ({} files, {:.1} s)",
                    r.name,
                    r.files.len(),
                    r.seconds
                )?,
                Some(e) => writeln!(f, "  failed {}: {e}", r.name)?,
            }
        }
        Ok(())
    }
}

/// Error message including the chain of causes
fn describe(e: &Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}

/// Submit one prediction and keep whatever it produced
///
/// Failures are caught and reported in the result rather than returned.
pub fn process_prediction<C: FormClient + ?Sized>(
    client: &mut C,
    config: &FonllConfig,
    prediction: &Prediction,
) -> ProcessingResult {
    info!("Processing {}", prediction.name);
    let start = Instant::now();
    let outcome = harvest(client, config, prediction);
    let seconds = start.elapsed().as_secs_f64();

    match outcome {
        Ok(files) => {
            info!(
                "{} done in {seconds:.1} s, {} files",
                prediction.name,
                files.len()
            );
            ProcessingResult {
                name: prediction.name.clone(),
                success: true,
                error: None,
                files,
                seconds,
            }
        }
        Err(e) => {
            let message = describe(&e);
            error!("{} failed: {message}", prediction.name);
            ProcessingResult {
                name: prediction.name.clone(),
                success: false,
                error: Some(message),
                files: Vec::new(),
                seconds,
            }
        }
    }
}

fn harvest<C: FormClient + ?Sized>(
    client: &mut C,
    config: &FonllConfig,
    prediction: &Prediction,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.output_dir)?;
    let form = form_pairs(prediction, config.email.as_deref());
    debug!("{}: submitting {} fields", prediction.name, form.len());
    let page = match client.submit(config.action_url(), &form) {
        Ok(page) => page,
        Err(e) => {
            let dump = match &e {
                Error::HttpStatus { body, .. } if !body.is_empty() => body.clone(),
                other => describe(other),
            };
            if let Err(write_error) = save_page(config, prediction, "error_page", &dump) {
                warn!("{}: unable to save the error page: {write_error}", prediction.name);
            }
            return Err(e);
        }
    };

    let outcome = save_results(client, config, prediction, &page);
    let status = if outcome.is_ok() { "page" } else { "error_page" };
    save_page(config, prediction, status, &page)?;
    outcome
}

/// Keep the page state as `<name>_<status>.html`
fn save_page(
    config: &FonllConfig,
    prediction: &Prediction,
    status: &str,
    page: &str,
) -> Result<()> {
    let path = config
        .output_dir
        .join(format!("{}_{status}.html", prediction.name));
    fs::write(&path, page)?;
    debug!("Page saved to {}", path.display());
    Ok(())
}

/// Download linked result files, or keep the text block of the page
fn save_results<C: FormClient + ?Sized>(
    client: &mut C,
    config: &FonllConfig,
    prediction: &Prediction,
    page: &str,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for link in result_links(page) {
        let url = resolve_link(config.action_url(), link);
        match client.fetch(&url) {
            Ok(bytes) => {
                let path = output_path(&config.output_dir, &prediction.name, file_name(link));
                fs::write(&path, bytes)?;
                files.push(path);
            }
            Err(e) => warn!("{}: unable to fetch {url}: {}", prediction.name, describe(&e)),
        }
    }

    if files.is_empty() {
        if let Some(text) = pre_block(page) {
            let path = config.output_dir.join(format!("{}.txt", prediction.name));
            fs::write(&path, text)?;
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(Error::NoResults {
            name: prediction.name.clone(),
        });
    }
    Ok(files)
}

fn output_path(dir: &Path, name: &str, file: &str) -> PathBuf {
    dir.join(format!("{name}_{file}"))
}

/// Process predictions one after the other with a single client
///
/// Waits `delay_between_predictions` seconds between submissions.
pub fn run_sequential<C: FormClient + ?Sized>(client: &mut C, config: &FonllConfig) -> Summary {
    info!(
        "Processing {} predictions sequentially",
        config.predictions.len()
    );
    let start = Instant::now();
    let mut results = Vec::with_capacity(config.predictions.len());
    for (i, prediction) in config.predictions.iter().enumerate() {
        if i > 0 && config.delay_between_predictions > 0 {
            std::thread::sleep(Duration::from_secs(config.delay_between_predictions));
        }
        results.push(process_prediction(client, config, prediction));
    }
    finish(results, start)
}

/// Process predictions on a pool of `workers()` threads
///
/// Every task gets a fresh client from `make_client`.
pub fn run_parallel<C, F>(config: &FonllConfig, make_client: F) -> Result<Summary>
where
    C: FormClient,
    F: Fn() -> C + Sync,
{
    let workers = config.workers();
    info!(
        "Processing {} predictions with {workers} workers",
        config.predictions.len()
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;

    let start = Instant::now();
    let results: Vec<ProcessingResult> = pool.install(|| {
        par_tqdm!(
            config
                .predictions
                .par_iter()
                .map(|p| process_prediction(&mut make_client(), config, p)),
            bar_format = "Predictions: {count}/{total} [{elapsed}]  "
        )
        .collect()
    });
    eprintln!();
    Ok(finish(results, start))
}

fn finish(results: Vec<ProcessingResult>, start: Instant) -> Summary {
    let summary = Summary::new(results, start.elapsed().as_secs_f64());
    info!(
        "Completed {}/{} predictions in {:.1} s",
        summary.successful, summary.total, summary.total_time
    );
    if summary.failed > 0 {
        warn!("Failed predictions: {}", summary.failed_names().join(", "));
    }
    summary
}

/// Harvest every prediction over HTTP, in parallel if configured
pub fn run(config: &FonllConfig) -> Result<Summary> {
    let make_client = || HttpClient::new(config.download_wait_time, config.wait_timeout);
    if config.parallel_mode {
        run_parallel(config, make_client)
    } else {
        Ok(run_sequential(&mut make_client(), config))
    }
}
