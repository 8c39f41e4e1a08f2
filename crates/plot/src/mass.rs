//! Invariant-mass fits and their residuals

// standard library
use std::path::Path;

// crate modules
use crate::error::Result;
use crate::style::{draw_labels, error_bars, markers, tab10, FONT};

// external crates
use hfxs_fit::{MassFit, Part};
use hfxs_hist::{Graph, Hist1D};
use hfxs_utils::ValueExt;
use log::info;
use plotters::prelude::*;

const CURVE_POINTS: usize = 500;
const SIZE: (u32, u32) = (900, 700);

/// Vertical extent of data and curves with some headroom
fn y_extent(graph: &Graph, curves: &[&[(f64, f64)]]) -> (f64, f64) {
    let data = graph.points.iter().flat_map(|p| [p.y_low(), p.y_high()]);
    let curves = curves.iter().flat_map(|c| c.iter().map(|(_, y)| *y));
    let (lo, hi) = data
        .chain(curves)
        .filter(|y| y.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let span = match hi - lo {
        s if s > 0.0 => s,
        _ => 1.0,
    };
    (lo - 0.05 * span * f64::from(lo < 0.0), hi + 0.25 * span)
}

fn bin_width_mev(hist: &Hist1D) -> f64 {
    1000.0 * (hist.hi() - hist.lo()) / hist.nbins().max(1) as f64
}

/// Text summarising the fitted peak
fn fit_summary(fit: &MassFit) -> Vec<String> {
    let mut lines = Vec::new();
    let (raw, raw_err) = fit.raw_yield();
    lines.push(format!("S = {}", raw.pm(raw_err, 0)));
    if let Some((mean, err)) = fit.mean() {
        lines.push(format!("μ = {} MeV/c²", (1000.0 * mean).pm(1000.0 * err, 1)));
    }
    if let Some((sigma, err)) = fit.sigma() {
        lines.push(format!("σ = {} MeV/c²", (1000.0 * sigma).pm(1000.0 * err, 1)));
    }
    if fit.model.has_background() {
        let (soverb, soverb_err) = fit.signal_over_background();
        lines.push(format!("S/B (3σ) = {}", soverb.pm(soverb_err, 2)));
    }
    let (significance, significance_err) = fit.significance();
    lines.push(format!("Significance (3σ) = {}", significance.pm(significance_err, 1)));
    let (chi2, ndf) = fit.chi2();
    lines.push(format!("χ²/ndf = {chi2:.1}/{ndf}"));
    lines
}

/// Data, total fit, background and signal components
pub fn mass_fit_figure<P: AsRef<Path>>(fit: &MassFit, output: P) -> Result<()> {
    let output = output.as_ref();
    let data = Graph::from_hist(&fit.data);
    let total = fit.curve(CURVE_POINTS, Part::Total);
    let background = fit.curve(CURVE_POINTS, Part::Background);
    let signal = fit.curve(CURVE_POINTS, Part::Signal);
    let (_, y_hi) = y_extent(&data, &[total.as_slice()]);

    let root = SVGBackend::new(output, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(55)
        .y_label_area_size(80)
        .build_cartesian_2d(fit.data.lo()..fit.data.hi(), 0.0..y_hi)?;

    let y_title = format!("Counts per {:.0} MeV/c²", bin_width_mev(&fit.data));
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("M(Dπ) (GeV/c²)")
        .y_desc(y_title.as_str())
        .label_style((FONT, 16))
        .draw()?;

    if fit.model.has_background() {
        chart
            .draw_series(LineSeries::new(background, tab10(3).stroke_width(2)))?
            .label("Background")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], tab10(3).stroke_width(2)));
    }
    chart
        .draw_series(LineSeries::new(signal, tab10(2).stroke_width(2)))?
        .label("Signal")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], tab10(2).stroke_width(2)));
    chart
        .draw_series(LineSeries::new(total, tab10(0).stroke_width(3)))?
        .label("Total fit")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], tab10(0).stroke_width(3)));

    chart.draw_series(error_bars(&data, BLACK, 0.0))?;
    chart
        .draw_series(markers(&data, BLACK, 3, 0.0))?
        .label("Data")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLACK.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font((FONT, 16))
        .border_style(TRANSPARENT)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    draw_labels(&root, &fit_summary(fit), (SIZE.0 as i32 - 330, 40), 18)?;
    root.present()?;
    info!("Mass fit figure written to {}", output.display());
    Ok(())
}

/// Data minus fitted background, with the signal component
pub fn residual_figure<P: AsRef<Path>>(fit: &MassFit, output: P) -> Result<()> {
    let output = output.as_ref();
    let residuals = Graph::from_hist(&fit.residuals());
    let signal = fit.curve(CURVE_POINTS, Part::Signal);
    let (y_lo, y_hi) = y_extent(&residuals, &[signal.as_slice()]);
    let (x_lo, x_hi) = (fit.data.lo(), fit.data.hi());

    let root = SVGBackend::new(output, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(55)
        .y_label_area_size(80)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    let y_title = format!("Counts - background per {:.0} MeV/c²", bin_width_mev(&fit.data));
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("M(Dπ) (GeV/c²)")
        .y_desc(y_title.as_str())
        .label_style((FONT, 16))
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        vec![(x_lo, 0.0), (x_hi, 0.0)],
        BLACK.mix(0.5),
    )))?;
    chart
        .draw_series(LineSeries::new(signal, tab10(2).stroke_width(2)))?
        .label("Signal")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], tab10(2).stroke_width(2)));
    chart.draw_series(error_bars(&residuals, BLACK, f64::NEG_INFINITY))?;
    chart
        .draw_series(markers(&residuals, BLACK, 3, f64::NEG_INFINITY))?
        .label("Data - background")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLACK.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font((FONT, 16))
        .border_style(TRANSPARENT)
        .draw()?;

    root.present()?;
    info!("Residual figure written to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hfxs_hist::Point;

    #[test]
    fn headroom_above_data() {
        let graph = Graph::new("g", vec![Point::symmetric(1.0, 8.0, 0.5, 2.0)]).unwrap();
        let curve = [(0.0, 4.0), (2.0, 6.0)];
        let (lo, hi) = y_extent(&graph, &[&curve[..]]);
        assert_eq!(lo, 0.0);
        assert_eq!(hi, 10.0 + 0.25 * 10.0);
    }

    #[test]
    fn negative_residuals_keep_margin() {
        let graph = Graph::new("g", vec![Point::symmetric(1.0, -2.0, 0.5, 1.0)]).unwrap();
        let (lo, _) = y_extent(&graph, &[]);
        assert!(lo < -3.0);
    }
}
