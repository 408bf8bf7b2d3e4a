//! Chart Viewer Widget
//! Central scrollable area: header, optional table preview, point map and the
//! chart for the current selection.

use crate::charts::{ChartPlotter, PointMap};
use crate::error::{ErrorKind, RenderError};
use crate::views::{RenderedView, ViewSelection};
use egui::{Color32, RichText, ScrollArea, TextureHandle};
use polars::prelude::DataFrame;

const PREVIEW_ROWS: usize = 5;
const HEADER_IMAGE_WIDTH: f32 = 1000.0;

/// What the chart viewer asks the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartViewerAction {
    None,
    OpenPointMapInBrowser,
    OpenHeatmapInBrowser,
}

/// Central panel contents. Holds the last render results, not the table.
#[derive(Default)]
pub struct ChartViewer {
    pub point_map: Option<Result<PointMap, RenderError>>,
    pub view: Option<(ViewSelection, Result<RenderedView, RenderError>)>,
    pub show_preview: bool,
    pub preview: Option<(DataFrame, (usize, usize))>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all render results (a new table is coming).
    pub fn clear(&mut self) {
        self.point_map = None;
        self.view = None;
        self.preview = None;
    }

    pub fn rows_to_preview() -> usize {
        PREVIEW_ROWS
    }

    /// Draw the chart viewer
    pub fn show(&mut self, ui: &mut egui::Ui, header_image: Option<&TextureHandle>) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("Toronto Crimes Data Exploration").size(26.0).strong());
                ui.label(RichText::new("Visualization using egui").size(16.0));
                ui.add_space(8.0);

                if let Some(texture) = header_image {
                    ui.add(egui::Image::new(texture).max_width(HEADER_IMAGE_WIDTH));
                    ui.add_space(8.0);
                }

                ui.checkbox(
                    &mut self.show_preview,
                    "Tick Box to show first rows of the data & shape of the data",
                );
                if self.show_preview {
                    if let Some((preview, shape)) = &self.preview {
                        ChartPlotter::draw_preview_table(ui, preview, *shape);
                    }
                }
                ui.add_space(12.0);

                Self::section_title(ui, "Displaying Point based map");
                match &self.point_map {
                    Some(Ok(map)) => {
                        ChartPlotter::draw_point_map(ui, map);
                        if ui.button("🌐 Open tiled point map").clicked() {
                            action = ChartViewerAction::OpenPointMapInBrowser;
                        }
                    }
                    Some(Err(e)) => Self::draw_error(ui, e),
                    None => {
                        ui.spinner();
                    }
                }
                ui.add_space(16.0);

                if let Some((selection, result)) = &self.view {
                    match result {
                        Ok(RenderedView::Nothing) => {}
                        Ok(RenderedView::HeatMap(heat)) => {
                            Self::section_title(ui, selection.label());
                            ChartPlotter::draw_heatmap(ui, heat);
                            if ui.button("🌐 Open interactive heat map").clicked() {
                                action = ChartViewerAction::OpenHeatmapInBrowser;
                            }
                        }
                        Ok(RenderedView::Count(chart)) => {
                            Self::section_title(ui, selection.label());
                            ChartPlotter::draw_count_chart(ui, chart);
                        }
                        Err(e) => {
                            Self::section_title(ui, selection.label());
                            Self::draw_error(ui, e);
                        }
                    }
                }
            });

        action
    }

    fn section_title(ui: &mut egui::Ui, text: &str) {
        ui.label(RichText::new(text).size(18.0).strong());
        ui.add_space(6.0);
    }

    /// Error card, colored by who has to fix it.
    fn draw_error(ui: &mut egui::Ui, error: &RenderError) {
        let (title, color) = match error.kind() {
            ErrorKind::Configuration => ("Configuration error", Color32::from_rgb(243, 156, 18)),
            ErrorKind::Data => ("Data error", Color32::from_rgb(220, 53, 69)),
            ErrorKind::ExternalService => ("External service error", Color32::from_rgb(155, 89, 182)),
        };

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(2.0, color))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(format!("⚠ {title}")).size(15.0).strong().color(color));
                ui.label(RichText::new(error.to_string()).size(12.0));
            });
    }
}
