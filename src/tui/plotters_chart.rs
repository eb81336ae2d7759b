//! Plotters-powered revenue projection chart for Ratatui.
//!
//! Shows cumulative subscription revenue over time against the predicted CLV.
//! The crossing point is the estimated lifetime.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description; all series and bounds are computed by the caller.
pub struct ProjectionChart<'a> {
    /// Cumulative revenue by month.
    pub revenue: &'a [(f64, f64)],
    /// Predicted CLV, drawn as a horizontal level.
    pub clv: f64,
    /// `(lifetime_months, clv)` crossing point.
    pub crossing: (f64, f64),
    /// Line color for the CLV level (follows the tier).
    pub clv_color: RGBColor,
    /// Tier lower bounds, drawn as faint levels when in range.
    pub thresholds: &'a [f64],
    /// X bounds (months).
    pub x_bounds: [f64; 2],
    /// Y bounds (MAD).
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for ProjectionChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
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
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("months")
                .y_desc("MAD")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let revenue_color = RGBColor(0, 255, 255); // cyan
            let threshold_color = RGBColor(90, 90, 90);

            for &level in self.thresholds.iter().filter(|&&t| t > y0 && t < y1) {
                chart.draw_series(LineSeries::new([(x0, level), (x1, level)], &threshold_color))?;
            }

            chart.draw_series(LineSeries::new(self.revenue.iter().copied(), &revenue_color))?;
            chart.draw_series(LineSeries::new([(x0, self.clv), (x1, self.clv)], &self.clv_color))?;

            // A single pixel, not a `Circle`: the backend scales circle radii
            // into canvas units and draws them far too large.
            chart.draw_series(std::iter::once(Pixel::new(self.crossing, WHITE)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
