//! Static Chart Renderer
//! Draws a count chart to a PNG image with plotters, for headless export.
//!
//! Layout:
//! 1. Title: the view name, centered
//! 2. Bars: one per category, vertical or horizontal as the view requires
//! 3. Axis labels: category names on the category axis, counts on the other

use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use std::io::Cursor;
use std::path::Path;

use super::{ChartPlotter, CountChart};
use crate::error::RenderError;
use crate::views::Orientation;

const MAX_LABEL_CHARS: usize = 28;

/// Largest accepted image side, in pixels.
pub const MAX_IMAGE_SIDE: u32 = 8192;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a count chart into PNG bytes.
    pub fn render_count_chart_png(
        chart: &CountChart,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; Self::buffer_len(width, height)?];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            match chart.orientation {
                Orientation::Vertical => Self::draw_vertical(&root, chart)?,
                Orientation::Horizontal => Self::draw_horizontal(&root, chart)?,
            }
            root.present().map_err(draw_err)?;
        }

        let image = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Export("bitmap buffer size mismatch".to_string()))?;
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| RenderError::Export(e.to_string()))?;
        Ok(png)
    }

    /// Render a count chart straight to a PNG file.
    pub fn save_count_chart_png(
        chart: &CountChart,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let png = Self::render_count_chart_png(chart, width, height)?;
        std::fs::write(path, png).map_err(|e| RenderError::Export(e.to_string()))?;
        tracing::info!(path = %path.display(), "count chart exported");
        Ok(())
    }

    fn draw_vertical<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        chart: &CountChart,
    ) -> Result<(), RenderError>
    where
        DB::ErrorType: 'static,
    {
        let n = chart.bars.len().max(1);
        let y_max = Self::axis_max(chart);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, ("sans-serif", 28))
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d((0..n).into_segmented(), 0u64..y_max)
            .map_err(draw_err)?;

        let labels: Vec<String> = chart.bars.iter().map(|b| short_label(&b.label)).collect();
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.column.as_str())
            .y_desc("count")
            .x_labels(n)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .draw()
            .map_err(draw_err)?;

        ctx.draw_series(
            Histogram::vertical(&ctx)
                .style_func(|v, _| bar_style(chart, v))
                .margin(6)
                .data(chart.bars.iter().enumerate().map(|(i, b)| (i, b.count))),
        )
        .map_err(draw_err)?;
        Ok(())
    }

    fn draw_horizontal<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        chart: &CountChart,
    ) -> Result<(), RenderError>
    where
        DB::ErrorType: 'static,
    {
        let n = chart.bars.len().max(1);
        let x_max = Self::axis_max(chart);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, ("sans-serif", 28))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(200)
            .build_cartesian_2d(0u64..x_max, (0..n).into_segmented())
            .map_err(draw_err)?;

        let labels: Vec<String> = chart.bars.iter().map(|b| short_label(&b.label)).collect();
        ctx.configure_mesh()
            .disable_y_mesh()
            .x_desc("count")
            .y_desc(chart.column.as_str())
            .y_labels(n)
            .y_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .draw()
            .map_err(draw_err)?;

        ctx.draw_series(
            Histogram::horizontal(&ctx)
                .style_func(|v, _| bar_style(chart, v))
                .margin(6)
                .data(chart.bars.iter().enumerate().map(|(i, b)| (i, b.count))),
        )
        .map_err(draw_err)?;
        Ok(())
    }

    /// RGB buffer size for a `width` x `height` bitmap.
    fn buffer_len(width: u32, height: u32) -> Result<usize, RenderError> {
        if width == 0 || height == 0 || width > MAX_IMAGE_SIDE || height > MAX_IMAGE_SIDE {
            return Err(RenderError::Export(format!(
                "image size {width}x{height} outside 1..={MAX_IMAGE_SIDE}"
            )));
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(3))
            .ok_or_else(|| RenderError::Export(format!("image size {width}x{height} too large")))
    }

    /// Count axis upper bound with 10% headroom.
    fn axis_max(chart: &CountChart) -> u64 {
        let max = chart.max_count().max(1);
        max + (max / 10).max(1)
    }
}

fn bar_style(chart: &CountChart, value: &SegmentValue<usize>) -> ShapeStyle {
    let index = match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i,
        SegmentValue::Last => 0,
    };
    let c = ChartPlotter::bar_color(chart, index);
    RGBColor(c.r(), c.g(), c.b()).filled()
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Export(e.to_string())
}

/// Truncate long category names so the label area stays readable.
fn short_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        label.to_string()
    } else {
        let mut s: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        s.push('…');
        s
    }
}
