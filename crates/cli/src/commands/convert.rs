//! `hfxs convert`

// standard library
use std::path::PathBuf;

// crate modules
use super::CommandResult;

// external crates
use clap::Subcommand;
use hfxs_theory::{convert_fonll, convert_model, convert_nnlo_nnll, Model, NnloBinning};
use log::info;

#[derive(Subcommand, Debug)]
pub enum ConvertCommand {
    /// NNLO+NNLL tables of a directory into histograms
    Nnlo {
        dir: PathBuf,
        output: PathBuf,
        /// pT bin edges of the differential histograms
        #[arg(long, value_delimiter = ',')]
        pt_edges: Option<Vec<f64>>,
    },
    /// A FONLL table into a uniformly binned histogram
    Fonll {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 100)]
        nbins: usize,
        #[arg(long, default_value_t = 0.0)]
        lo: f64,
        #[arg(long, default_value_t = 100.0)]
        hi: f64,
    },
    /// A prediction table into a graph with its uncertainty band
    Theory {
        input: PathBuf,
        output: PathBuf,
        /// Format of the table
        #[arg(short, long)]
        model: Model,
        /// Name of the graph
        #[arg(short, long, default_value = "g_prediction")]
        name: String,
    },
}

pub fn run(command: &ConvertCommand) -> CommandResult {
    let (store, output) = match command {
        ConvertCommand::Nnlo {
            dir,
            output,
            pt_edges,
        } => {
            let mut binning = NnloBinning::default();
            if let Some(edges) = pt_edges {
                binning.pt_edges = edges.clone();
            }
            (convert_nnlo_nnll(dir, &binning)?, output)
        }
        ConvertCommand::Fonll {
            input,
            output,
            nbins,
            lo,
            hi,
        } => (convert_fonll(input, *nbins, *lo, *hi)?, output),
        ConvertCommand::Theory {
            input,
            output,
            model,
            name,
        } => (convert_model(input, *model, name)?, output),
    };
    store.write(output)?;
    info!("{} objects written to {}", store.len(), output.display());
    Ok(())
}
