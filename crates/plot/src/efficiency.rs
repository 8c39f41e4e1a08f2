//! Acceptance and efficiency figure

// standard library
use std::path::Path;
use std::str::FromStr;

// crate modules
use crate::error::{Error, Result};
use crate::style::{draw_labels, error_bars, markers, tab10, FONT};

// external crates
use hfxs_hist::{Graph, Hist1D, Store};
use log::info;
use plotters::prelude::*;

/// Beauty hadrons with a known decay channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Particle {
    B0,
    Bplus,
    Bs,
}

impl Particle {
    /// Decay chain written on figures, empty if there is no standard one
    pub fn decay_channel(&self) -> &'static str {
        match self {
            Particle::B0 => "B⁰ → D⁻π⁺ → π⁻K⁺π⁻π⁺",
            Particle::Bplus => "B⁺ → D̄⁰π⁺ → π⁻K⁺π⁺",
            Particle::Bs => "",
        }
    }
}

impl FromStr for Particle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "B0" => Ok(Particle::B0),
            "Bplus" => Ok(Particle::Bplus),
            "Bs" => Ok(Particle::Bs),
            other => Err(Error::UnknownParticle(other.to_string())),
        }
    }
}

/// Histogram outline, flat across every bin
fn steps(hist: &Hist1D) -> Vec<(f64, f64)> {
    hist.contents
        .iter()
        .enumerate()
        .flat_map(|(i, c)| [(hist.edges[i], *c), (hist.edges[i + 1], *c)])
        .collect()
}

const Y_RANGE: [f64; 2] = [1e-4, 10.0];

/// Draw `h_acc` and `h_eff` from `store` on a logarithmic axis
pub fn efficiency_figure<P: AsRef<Path>>(
    store: &Store,
    output: P,
    particle: Particle,
) -> Result<()> {
    let acceptance = store.get_hist("h_acc")?;
    let efficiency = store.get_hist("h_eff")?;
    let output = output.as_ref();
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let root = SVGBackend::new(output, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let [y_lo, y_hi] = Y_RANGE;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(55)
        .y_label_area_size(80)
        .build_cartesian_2d(efficiency.lo()..efficiency.hi(), (y_lo..y_hi).log_scale())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("pT (GeV/c)")
        .y_desc("Acceptance × efficiency")
        .label_style((FONT, 18))
        .draw()?;

    let curves = [
        (acceptance, tab10(2), "Acceptance"),
        (efficiency, tab10(0), "Acceptance × Efficiency"),
    ];
    for (hist, color, label) in curves {
        let floored = steps(hist).into_iter().map(|(x, y)| (x, y.max(y_lo)));
        chart.draw_series(LineSeries::new(floored, color.stroke_width(2)))?;

        let graph = Graph::from_hist(hist);
        chart.draw_series(error_bars(&graph, color, y_lo))?;
        chart
            .draw_series(markers(&graph, color, 6, y_lo))?
            .label(label)
            .legend(move |(x, y)| Circle::new((x + 10, y), 6, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerMiddle)
        .label_font((FONT, 20))
        .border_style(TRANSPARENT)
        .draw()?;

    let mut lines = vec![
        "ALICE".to_string(),
        "pp collisions, √s = 13.6 TeV".to_string(),
        "|y| < 0.5".to_string(),
    ];
    let channel = particle.decay_channel();
    if !channel.is_empty() {
        lines.push(channel.to_string());
        lines.push("and charge conjugate".to_string());
    }
    draw_labels(&root, &lines, (130, 50), 22)?;

    root.present()?;
    info!("Efficiency figure written to {}", output.display());
    Ok(())
}
