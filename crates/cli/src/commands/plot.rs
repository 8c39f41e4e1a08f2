//! `hfxs plot`

// standard library
use std::path::PathBuf;

// crate modules
use super::CommandResult;

// external crates
use clap::Subcommand;
use hfxs_hist::Store;
use hfxs_plot::{comparison_figure, efficiency_figure, ComparisonConfig, Particle};

#[derive(Subcommand, Debug)]
pub enum PlotCommand {
    /// Measured spectrum against references and predictions
    Compare { config: PathBuf },
    /// Acceptance and efficiency from a store with `h_acc` and `h_eff`
    Efficiency {
        store: PathBuf,
        output: PathBuf,
        #[arg(short, long, default_value = "B0")]
        particle: Particle,
    },
}

pub fn run(command: &PlotCommand) -> CommandResult {
    match command {
        PlotCommand::Compare { config } => {
            let config = ComparisonConfig::from_file(config)?;
            comparison_figure(&config)?;
        }
        PlotCommand::Efficiency {
            store,
            output,
            particle,
        } => {
            let store = Store::read(store)?;
            efficiency_figure(&store, output, *particle)?;
        }
    }
    Ok(())
}
