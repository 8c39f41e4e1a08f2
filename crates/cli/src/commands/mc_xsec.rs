//! `hfxs mc-xsec`

// standard library
use std::path::PathBuf;

// crate modules
use super::CommandResult;

// external crates
use clap::Args;
use hfxs_xsec::{generator_cross_section_from_config, GeneratorConfig};

#[derive(Args, Debug)]
pub struct McXsecArgs {
    /// YAML configuration with the generator folder, pT bins and output
    pub config: PathBuf,
}

pub fn run(args: &McXsecArgs) -> CommandResult {
    let config = GeneratorConfig::from_file(&args.config)?;
    let hist = generator_cross_section_from_config(&config)?;
    println!("{hist}");
    Ok(())
}
