//! `hfxs fit`

// standard library
use std::path::PathBuf;

// crate modules
use super::CommandResult;

// external crates
use clap::Args;
use hfxs_fit::{extract_from_config, FitConfig};
use hfxs_plot::{mass_fit_figure, residual_figure};
use log::{info, warn};

#[derive(Args, Debug)]
pub struct FitArgs {
    /// YAML configuration with inputs, selections and fit settings
    pub config: PathBuf,

    /// Skip the mass and residual figures
    #[arg(long)]
    pub no_figures: bool,
}

pub fn run(args: &FitArgs) -> CommandResult {
    let config = FitConfig::from_file(&args.config)?;
    let (path, extraction) = extract_from_config(&config)?;

    for fit in &extraction.fits {
        let (raw, raw_err) = fit.raw_yield();
        let (significance, _) = fit.significance();
        println!(
            "{:<14} converged: {:<5} raw yield: {raw:>10.1} ± {raw_err:<8.1} significance: {significance:.1}",
            fit.name,
            fit.converged()
        );
    }

    if !args.no_figures {
        let dir = &config.outputs.directory;
        for fit in extraction.fits.iter().filter(|f| f.converged()) {
            mass_fit_figure(fit, dir.join(format!("B0_mass_{}.svg", fit.name)))?;
            residual_figure(fit, dir.join(format!("B0_massres_{}.svg", fit.name)))?;
        }
        let skipped = extraction.fits.iter().filter(|f| !f.converged()).count();
        if skipped > 0 {
            warn!("No figures for {skipped} fits that did not converge");
        }
    }

    info!("Raw yields stored in {}", path.display());
    Ok(())
}
