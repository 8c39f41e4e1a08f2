//! `hfxs integrate`

// standard library
use std::path::PathBuf;

// crate modules
use super::CommandResult;

// external crates
use clap::Args;
use hfxs_xsec::{integrate_from_config, IntegrateConfig};

#[derive(Args, Debug)]
pub struct IntegrateArgs {
    /// YAML configuration with inputs, systematics and output
    pub config: PathBuf,
}

pub fn run(args: &IntegrateArgs) -> CommandResult {
    let config = IntegrateConfig::from_file(&args.config)?;
    let result = integrate_from_config(&config)?;
    println!("{result}");
    Ok(())
}
