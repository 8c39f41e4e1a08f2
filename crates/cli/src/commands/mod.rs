//! One module per subcommand, each with its arguments and a `run`

pub mod convert;
pub mod download;
pub mod fit;
pub mod fonll;
pub mod integrate;
pub mod mc_xsec;
pub mod plot;

// standard library
use std::fmt;
use std::str::FromStr;

/// Boxed error shared by every subcommand
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Parse a `lo:hi` interval
pub fn parse_interval<T>(s: &str) -> Result<(T, T), String>
where
    T: FromStr + PartialOrd + fmt::Display,
    T::Err: fmt::Display,
{
    let (lo, hi) = s
        .split_once(':')
        .ok_or_else(|| format!("expected 'lo:hi', found '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<T>()
            .map_err(|e| format!("invalid bound '{v}': {e}"))
    };
    let (lo, hi) = (parse(lo)?, parse(hi)?);
    if lo >= hi {
        return Err(format!("empty interval [{lo}, {hi}]"));
    }
    Ok((lo, hi))
}
