//! `hfxs fonll`

// standard library
use std::path::PathBuf;

// crate modules
use super::{parse_interval, CommandResult};

// external crates
use clap::{Args, Subcommand};
use hfxs_fonll::{sample_config, Bound, FonllConfig};
use log::{info, warn};

#[derive(Subcommand, Debug)]
pub enum FonllCommand {
    /// Submit every prediction and download the results
    Run(RunArgs),
    /// Replace each prediction by one per pT and rapidity interval
    Expand(ExpandArgs),
    /// Write an example configuration
    Sample {
        #[arg(default_value = "fonll_config.yaml")]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    pub config: PathBuf,

    /// Use a worker pool, whatever the configuration says
    #[arg(long, conflicts_with = "sequential")]
    pub parallel: bool,

    /// One prediction at a time, whatever the configuration says
    #[arg(long)]
    pub sequential: bool,

    /// Size of the worker pool in parallel mode
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_workers: Option<u64>,
}

impl RunArgs {
    /// Command line choices take precedence over the file
    pub fn apply(&self, config: &mut FonllConfig) {
        if self.parallel {
            config.parallel_mode = true;
        }
        if self.sequential {
            config.parallel_mode = false;
        }
        if let Some(n) = self.max_workers {
            config.max_workers = Some(n as usize);
        }
    }
}

#[derive(Args, Debug)]
pub struct ExpandArgs {
    pub config: PathBuf,

    /// pT intervals, e.g. `0:1,1:2`, bounds are named as typed
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_interval::<Bound>,
        allow_hyphen_values = true,
        required = true
    )]
    pub pt: Vec<(Bound, Bound)>,

    /// Rapidity intervals, e.g. `-0.5:0.5`
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_interval::<Bound>,
        allow_hyphen_values = true,
        required = true
    )]
    pub y: Vec<(Bound, Bound)>,

    /// Where the expanded configuration goes, the input by default
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(command: &FonllCommand) -> CommandResult {
    match command {
        FonllCommand::Run(args) => {
            let mut config = FonllConfig::from_file(&args.config)?;
            args.apply(&mut config);
            let summary = hfxs_fonll::run(&config)?;
            println!("{summary}");
            if summary.failed > 0 {
                warn!("Failed: {}", summary.failed_names().join(", "));
            }
        }
        FonllCommand::Expand(args) => {
            let mut config = FonllConfig::from_file(&args.config)?;
            let before = config.predictions.len();
            config.expand(&args.pt, &args.y);
            let output = args.output.as_ref().unwrap_or(&args.config);
            config.write(output)?;
            info!(
                "{before} predictions expanded to {} in {}",
                config.predictions.len(),
                output.display()
            );
        }
        FonllCommand::Sample { path } => {
            sample_config(path)?;
            info!("Example configuration written to {}", path.display());
        }
    }
    Ok(())
}
