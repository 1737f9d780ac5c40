//! Plotters-powered "visitors over time" chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`. The x axis is the position in the date series;
//! tick labels map positions back to the date strings.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct VisitorsChart<'a> {
    /// `(index, total_visitors)` per date, in date order.
    pub series: &'a [(f64, f64)],
    /// Date label for each index in `series`.
    pub dates: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> VisitorsChart<'a> {
    fn date_label(&self, x: f64) -> String {
        if x < 0.0 {
            return String::new();
        }
        self.dates
            .get(x.round() as usize)
            .map(|d| d.get(5..).unwrap_or(d).to_string())
            .unwrap_or_default()
    }
}

impl<'a> Widget for VisitorsChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| self.date_label(*v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(99, 102, 241); // indigo
            chart.draw_series(LineSeries::new(self.series.iter().copied(), &line_color))?;

            // Colored pixels mark each date; circle markers render oversized
            // through this backend.
            chart.draw_series(self.series.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Build the plotted series and padded bounds from per-date totals.
pub fn visitors_series(totals: &[u64]) -> (Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let series: Vec<(f64, f64)> = totals
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v as f64))
        .collect();

    let x_max = (series.len().saturating_sub(1)).max(1) as f64;
    let y_max = totals.iter().copied().max().unwrap_or(0) as f64;
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    (series, [0.0, x_max], [0.0, y_max])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_bounds_cover_data() {
        let (series, x, y) = visitors_series(&[4, 6, 2]);
        assert_eq!(series, vec![(0.0, 4.0), (1.0, 6.0), (2.0, 2.0)]);
        assert_eq!(x, [0.0, 2.0]);
        assert!(y[1] > 6.0);
    }

    #[test]
    fn single_point_still_has_positive_span() {
        let (_, x, y) = visitors_series(&[0]);
        assert!(x[1] > x[0]);
        assert!(y[1] > y[0]);
    }

    #[test]
    fn labels_strip_year() {
        let dates = vec!["2023-07-15".to_string(), "2023-07-16".to_string()];
        let chart = VisitorsChart {
            series: &[],
            dates: &dates,
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
        };
        assert_eq!(chart.date_label(0.2), "07-15");
        assert_eq!(chart.date_label(1.0), "07-16");
        assert_eq!(chart.date_label(5.0), "");
    }
}
