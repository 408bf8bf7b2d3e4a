//! Chart Plotter Module
//! Draws the point map, heat map and count charts interactively using egui_plot.

use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, MarkerShape, Plot, PlotPoints, Points};
use polars::prelude::DataFrame;

use super::{CountChart, HeatMap, PointMap};
use crate::data::cell_text;
use crate::views::{BarColors, Orientation};

pub const BAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// Heat ramp from cool to hot, indexed by intensity bucket.
const HEAT_RAMP: [Color32; 6] = [
    Color32::from_rgb(0, 0, 255),
    Color32::from_rgb(0, 255, 255),
    Color32::from_rgb(0, 255, 0),
    Color32::from_rgb(255, 255, 0),
    Color32::from_rgb(255, 128, 0),
    Color32::from_rgb(255, 0, 0),
];

const MAP_HEIGHT: f32 = 420.0;
const CHART_HEIGHT: f32 = 380.0;

/// Creates the dashboard visualizations using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the n-th category.
    pub fn get_category_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Fill of the i-th bar of a count chart.
    pub fn bar_color(chart: &CountChart, index: usize) -> Color32 {
        match chart.colors {
            BarColors::Uniform => BAR_COLOR,
            BarColors::PerCategory => Self::get_category_color(index),
        }
    }

    /// Heat ramp bucket for a cell count.
    pub fn heat_bucket(count: u32, max: u32) -> usize {
        if max == 0 {
            return 0;
        }
        // sqrt scale
        let t = (count as f64 / max as f64).sqrt();
        ((t * HEAT_RAMP.len() as f64) as usize).min(HEAT_RAMP.len() - 1)
    }

    /// Longitude/latitude scatter, one colored trace per MCI category.
    pub fn draw_point_map(ui: &mut egui::Ui, map: &PointMap) {
        let (min_lon, max_lon, min_lat, max_lat) = map.view.bounds();

        Plot::new("point_map")
            .height(MAP_HEIGHT)
            .legend(Legend::default())
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .data_aspect(1.0 / map.view.center.lat.to_radians().cos() as f32)
            .include_x(min_lon)
            .include_x(max_lon)
            .include_y(min_lat)
            .include_y(max_lat)
            .show(ui, |plot_ui| {
                for (i, trace) in map.traces.iter().enumerate() {
                    let points: PlotPoints = trace.points.iter().map(|p| [p.lon, p.lat]).collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(1.5)
                            .color(Self::get_category_color(i).gamma_multiply(0.7))
                            .name(&trace.category),
                    );
                }
            });

        ui.label(
            RichText::new(format!(
                "{} incidents plotted, {} without coordinates",
                map.point_count(),
                map.skipped
            ))
            .size(11.0)
            .color(Color32::GRAY),
        );
    }

    /// Density grid drawn as square markers colored along the heat ramp.
    pub fn draw_heatmap(ui: &mut egui::Ui, heat: &HeatMap) {
        let grid = &heat.grid;
        let max = grid.max();

        let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); HEAT_RAMP.len()];
        for (col, row, count) in grid.occupied() {
            let (lon, lat) = grid.cell_center(col, row);
            buckets[Self::heat_bucket(count, max)].push([lon, lat]);
        }

        let (min_lon, max_lon, min_lat, max_lat) = grid.bounds;

        Plot::new("heat_map")
            .height(MAP_HEIGHT)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .data_aspect(1.0 / heat.view.center.lat.to_radians().cos() as f32)
            .include_x(min_lon)
            .include_x(max_lon)
            .include_y(min_lat)
            .include_y(max_lat)
            .show(ui, |plot_ui| {
                for (bucket, cells) in buckets.into_iter().enumerate() {
                    if cells.is_empty() {
                        continue;
                    }
                    plot_ui.points(
                        Points::new(PlotPoints::from(cells))
                            .shape(MarkerShape::Square)
                            .filled(true)
                            .radius(2.5)
                            .color(HEAT_RAMP[bucket].gamma_multiply(0.6)),
                    );
                }
            });

        let note = if heat.is_truncated() {
            format!(
                "Showing the first {} of {} incidents",
                heat.rows_used, heat.rows_total
            )
        } else {
            format!("Showing all {} incidents", heat.rows_total)
        };
        ui.label(RichText::new(note).size(11.0).color(Color32::GRAY));
    }

    /// Count-of-occurrences bar chart.
    pub fn draw_count_chart(ui: &mut egui::Ui, chart: &CountChart) {
        let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();
        let horizontal = chart.orientation == Orientation::Horizontal;

        let bars: Vec<Bar> = chart
            .bars
            .iter()
            .enumerate()
            .map(|(i, b)| {
                Bar::new(i as f64, b.count as f64)
                    .name(&b.label)
                    .width(0.7)
                    .fill(Self::bar_color(chart, i))
            })
            .collect();

        let mut bar_chart = BarChart::new(bars).color(BAR_COLOR).name("count");
        if horizontal {
            bar_chart = bar_chart.horizontal();
        }

        let label_at = move |value: f64| -> String {
            let idx = value.round();
            if (value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        };

        let plot = Plot::new(format!("count_{}", chart.column))
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .include_x(0.0)
            .include_y(0.0);

        let plot = if horizontal {
            plot.x_axis_label("count")
                .y_axis_label(chart.column.as_str())
                .y_axis_formatter(move |mark, _range| label_at(mark.value))
        } else {
            plot.x_axis_label(chart.column.as_str())
                .y_axis_label("count")
                .x_axis_formatter(move |mark, _range| label_at(mark.value))
        };

        plot.show(ui, |plot_ui| plot_ui.bar_chart(bar_chart));
    }

    /// First rows of the table plus its shape.
    pub fn draw_preview_table(ui: &mut egui::Ui, preview: &DataFrame, shape: (usize, usize)) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::ScrollArea::horizontal().show(ui, |ui| {
                    egui::Grid::new("preview_table")
                        .striped(true)
                        .min_col_width(55.0)
                        .spacing([8.0, 4.0])
                        .show(ui, |ui| {
                            for column in preview.get_columns() {
                                ui.label(RichText::new(column.name().as_str()).strong().size(11.0));
                            }
                            ui.end_row();

                            for row in 0..preview.height() {
                                for column in preview.get_columns() {
                                    let text = column.get(row).map(cell_text).unwrap_or_default();
                                    ui.label(RichText::new(text).size(11.0));
                                }
                                ui.end_row();
                            }
                        });
                });
            });

        ui.label(RichText::new(format!("({}, {})", shape.0, shape.1)).size(11.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_bucket_bounds() {
        assert_eq!(ChartPlotter::heat_bucket(0, 0), 0);
        assert_eq!(ChartPlotter::heat_bucket(1, 100), 0);
        assert_eq!(ChartPlotter::heat_bucket(100, 100), HEAT_RAMP.len() - 1);
        assert!(ChartPlotter::heat_bucket(25, 100) < ChartPlotter::heat_bucket(81, 100));
    }

    #[test]
    fn test_bar_color_follows_chart_setting() {
        let mut chart = CountChart {
            title: "Offence".into(),
            column: "offence".into(),
            orientation: Orientation::Horizontal,
            colors: BarColors::Uniform,
            bars: Vec::new(),
        };
        assert_eq!(ChartPlotter::bar_color(&chart, 3), BAR_COLOR);

        chart.colors = BarColors::PerCategory;
        assert_eq!(ChartPlotter::bar_color(&chart, 0), PALETTE[0]);
        assert_eq!(ChartPlotter::bar_color(&chart, 1), PALETTE[1]);
    }

    #[test]
    fn test_category_colors_cycle() {
        assert_eq!(
            ChartPlotter::get_category_color(0),
            ChartPlotter::get_category_color(PALETTE.len())
        );
    }
}
