//! The `hfxs` command line tool
//!
#![doc = include_str!("../readme.md")]

// standard library
use std::error::Error;
use std::process::ExitCode;

// crate modules
mod commands;
use commands::{
    convert::{self, ConvertCommand},
    download::{self, DownloadArgs},
    fit::{self, FitArgs},
    fonll::{self, FonllCommand},
    integrate::{self, IntegrateArgs},
    mc_xsec::{self, McXsecArgs},
    plot::{self, PlotCommand},
};

// external crates
use clap::{ArgAction, Parser, Subcommand};
use log::error;

#[derive(Parser, Debug)]
#[command(name = "hfxs", version, about = "Heavy-flavour cross-section toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More detailed logging, repeat for more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Visible and extrapolated integrated cross section
    Integrate(IntegrateArgs),
    /// pT-differential cross section from generator runs
    McXsec(McXsecArgs),
    /// Raw yields from invariant-mass fits
    Fit(FitArgs),
    /// Download and merge train outputs from the grid
    Download(DownloadArgs),
    /// Predictions from the FONLL web form
    #[command(subcommand)]
    Fonll(FonllCommand),
    /// Theory tables to stores
    #[command(subcommand)]
    Convert(ConvertCommand),
    /// Figures
    #[command(subcommand)]
    Plot(PlotCommand),
}

fn init_logging(cli: &Cli) {
    let verbosity = 2 + usize::from(cli.verbose);
    let outcome = stderrlog::new()
        .verbosity(verbosity)
        .quiet(cli.quiet)
        .show_level(true)
        .init();
    if let Err(e) = outcome {
        eprintln!("Unable to start logging: {e}");
    }
}

/// Message with every underlying cause on its own line
fn report(e: &dyn Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    message
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let outcome = match &cli.command {
        Command::Integrate(args) => integrate::run(args),
        Command::McXsec(args) => mc_xsec::run(args),
        Command::Fit(args) => fit::run(args),
        Command::Download(args) => download::run(args),
        Command::Fonll(command) => fonll::run(command),
        Command::Convert(command) => convert::run(command),
        Command::Plot(command) => plot::run(command),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", report(e.as_ref()));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use hfxs_fonll::Bound;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["hfxs", "fit", "config.yaml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Fit(_)));
    }

    #[test]
    fn fonll_expand_intervals() {
        let cli = Cli::try_parse_from([
            "hfxs", "fonll", "expand", "fonll.yaml", "--pt", "0:1,1:2.5", "--y", "-0.5:0.5",
        ])
        .unwrap();
        let Command::Fonll(FonllCommand::Expand(args)) = cli.command else {
            panic!("expected fonll expand");
        };
        let values = |v: &[(Bound, Bound)]| -> Vec<(f64, f64)> {
            v.iter().map(|(lo, hi)| (lo.value(), hi.value())).collect()
        };
        assert_eq!(values(&args.pt), vec![(0.0, 1.0), (1.0, 2.5)]);
        assert_eq!(values(&args.y), vec![(-0.5, 0.5)]);
        assert_eq!(args.pt[1].1.to_string(), "2.5");
        assert!(args.output.is_none());
    }

    #[test]
    fn reversed_interval_is_rejected() {
        let result = Cli::try_parse_from([
            "hfxs", "fonll", "expand", "c.yaml", "--pt", "2:1", "--y", "0:1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn fonll_run_overrides() {
        let cli = Cli::try_parse_from([
            "hfxs", "fonll", "run", "fonll.yaml", "--parallel", "--max-workers", "6",
        ])
        .unwrap();
        let Command::Fonll(FonllCommand::Run(args)) = cli.command else {
            panic!("expected fonll run");
        };
        assert!(args.parallel);
        assert_eq!(args.max_workers, Some(6));

        let both = ["hfxs", "fonll", "run", "c.yaml", "--parallel", "--sequential"];
        assert!(Cli::try_parse_from(both).is_err());
        let zero = ["hfxs", "fonll", "run", "c.yaml", "--max-workers", "0"];
        assert!(Cli::try_parse_from(zero).is_err());
    }
}
