//! Colours, fonts and the elements shared by every figure

// crate modules
use crate::error::{Error, Result};

// external crates
use hfxs_hist::Graph;
use plotters::element::ErrorBarOrientV;
use plotters::prelude::*;

/// The matplotlib `tab10` palette
pub const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Palette colour by index, wrapping around
///
/// ```rust
/// # use hfxs_plot::{tab10, TAB10};
/// assert_eq!(tab10(2), TAB10[2]);
/// assert_eq!(tab10(12), TAB10[2]);
/// ```
pub fn tab10(index: usize) -> RGBColor {
    TAB10[index % TAB10.len()]
}

pub(crate) const FONT: &str = "sans-serif";

/// Check that an axis range can be drawn, strictly positive if logarithmic
pub(crate) fn check_range(axis: &'static str, range: [f64; 2], log: bool) -> Result<()> {
    let [lo, hi] = range;
    let finite = lo.is_finite() && hi.is_finite();
    if !finite || lo >= hi || (log && lo <= 0.0) {
        return Err(Error::InvalidRange { axis, lo, hi });
    }
    Ok(())
}

/// Vertical error bars with markers
pub(crate) fn error_bars(graph: &Graph, color: RGBColor, floor: f64) -> Vec<ErrorBar<f64, f64, ErrorBarOrientV<f64, f64>>> {
    graph
        .points
        .iter()
        .map(|p| {
            ErrorBar::new_vertical(
                p.x,
                p.y_low().max(floor),
                p.y.max(floor),
                p.y_high().max(floor),
                color.filled().stroke_width(2),
                8,
            )
        })
        .collect()
}

/// Horizontal bars showing the x extent of each point
pub(crate) fn x_bars(graph: &Graph, color: RGBColor, floor: f64) -> Vec<PathElement<(f64, f64)>> {
    graph
        .points
        .iter()
        .map(|p| {
            let y = p.y.max(floor);
            PathElement::new(vec![(p.x - p.exl, y), (p.x + p.exh, y)], color.stroke_width(2))
        })
        .collect()
}

/// Markers at the points
pub(crate) fn markers(
    graph: &Graph,
    color: RGBColor,
    size: u32,
    floor: f64,
) -> Vec<Circle<(f64, f64), u32>> {
    graph
        .points
        .iter()
        .map(|p| Circle::new((p.x, p.y.max(floor)), size, color.filled()))
        .collect()
}

/// Open boxes of half the x width, as drawn for systematic uncertainties
pub(crate) fn syst_boxes(graph: &Graph, color: RGBColor, floor: f64) -> Vec<Rectangle<(f64, f64)>> {
    graph
        .points
        .iter()
        .map(|p| {
            let (left, right) = (p.x - 0.5 * p.exl, p.x + 0.5 * p.exh);
            Rectangle::new(
                [(left, p.y_low().max(floor)), (right, p.y_high().max(floor))],
                color.stroke_width(2),
            )
        })
        .collect()
}

/// Filled boxes covering the full point extent, for theory bands
pub(crate) fn band_boxes(
    graph: &Graph,
    color: RGBColor,
    alpha: f64,
    floor: f64,
) -> Vec<Rectangle<(f64, f64)>> {
    graph
        .points
        .iter()
        .map(|p| {
            Rectangle::new(
                [
                    (p.x - p.exl, p.y_low().max(floor)),
                    (p.x + p.exh, p.y_high().max(floor)),
                ],
                color.mix(alpha).filled(),
            )
        })
        .collect()
}

/// Lines of text stacked down from `origin`, in pixels of the area
pub(crate) fn draw_labels<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    lines: &[String],
    origin: (i32, i32),
    size: u32,
) -> Result<()> {
    let style = TextStyle::from((FONT, size).into_font()).color(&BLACK);
    for (i, line) in lines.iter().enumerate() {
        let y = origin.1 + i as i32 * (size as i32 + 6);
        area.draw_text(line, &style, (origin.0, y))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges() {
        assert!(check_range("x", [0.0, 10.0], false).is_ok());
        assert!(check_range("y", [0.0, 10.0], true).is_err());
        assert!(check_range("y", [1.0, 1.0], false).is_err());
        assert!(check_range("y", [f64::NAN, 1.0], false).is_err());
    }

    #[test]
    fn palette_starts_with_blue() {
        assert_eq!(tab10(0), RGBColor(31, 119, 180));
    }
}
