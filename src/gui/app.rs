//! Crime Explorer Main Application
//! Main window with control panel and chart viewer.

use crate::config::Settings;
use crate::data::IncidentStore;
use crate::error::RenderError;
use crate::gui::{ChartViewer, ChartViewerAction, ControlPanel, ControlPanelAction};
use crate::tiles::TileCredential;
use crate::views::{RenderedView, ViewDispatcher};
use egui::{SidePanel, TextureHandle};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;

const HEATMAP_HTML: &str = "crime_explorer_heatmap.html";
const POINT_MAP_HTML: &str = "crime_explorer_point_map.html";

/// CSV loading result from background thread
enum LoadResult {
    Progress(String),
    Complete { path: PathBuf, df: DataFrame },
    Error(String),
}

/// Main application window.
pub struct CrimeExplorerApp {
    store: IncidentStore,
    tiles: TileCredential,
    settings: Settings,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    header_image: Option<TextureHandle>,

    // Set whenever the table or the selection changes
    needs_render: bool,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl CrimeExplorerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        store: IncidentStore,
        tiles: TileCredential,
        settings: Settings,
    ) -> Self {
        let header_image = load_header_image(&cc.egui_ctx, &settings.image_path);
        let mut control_panel = ControlPanel::new(store.path().to_path_buf());
        let (rows, cols) = store.shape();
        control_panel.set_progress(0.0, &format!("Loaded {} rows, {} columns", rows, cols));

        Self {
            store,
            tiles,
            settings,
            control_panel,
            chart_viewer: ChartViewer::new(),
            header_image,
            needs_render: true,
            load_rx: None,
            is_loading: false,
        }
    }

    /// Recompute the point map, the preview and the selected view.
    fn refresh_views(&mut self) {
        let selection = self.control_panel.selection;
        let dispatcher = ViewDispatcher::new(&self.store, &self.tiles);

        if self.chart_viewer.point_map.is_none() {
            let point_map = dispatcher.point_map();
            if let Err(e) = &point_map {
                tracing::warn!(error = %e, kind = ?e.kind(), "point map unavailable");
            }
            self.chart_viewer.point_map = Some(point_map);
        }

        if self.chart_viewer.preview.is_none() {
            self.chart_viewer.preview = Some((
                self.store.preview(ChartViewer::rows_to_preview()),
                self.store.shape(),
            ));
        }

        let view = dispatcher.render(selection);
        if let Err(e) = &view {
            tracing::warn!(view = %selection, error = %e, kind = ?e.kind(), "view failed to render");
        }
        self.chart_viewer.view = Some((selection, view));
        self.needs_render = false;
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_loading(path);
        }
    }

    /// Re-read the current data file in the background.
    fn handle_reload(&mut self) {
        if self.is_loading {
            return;
        }
        let path = self.store.path().to_path_buf();
        self.start_loading(path);
    }

    fn start_loading(&mut self, path: PathBuf) {
        self.control_panel.csv_path = Some(path.clone());
        self.control_panel.set_progress(0.0, "Loading CSV file...");
        self.control_panel.busy = true;
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));

            match IncidentStore::read_table(&path) {
                Ok(df) => {
                    let _ = tx.send(LoadResult::Complete { path, df });
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };
        let mut should_keep_receiver = true;

        while let Ok(result) = rx.try_recv() {
            match result {
                LoadResult::Progress(status) => {
                    self.control_panel.set_progress(30.0, &status);
                }
                LoadResult::Complete { path, df } => {
                    let (rows, cols) = df.shape();
                    self.store.replace(path, df);
                    self.chart_viewer.clear();
                    self.needs_render = true;
                    self.control_panel
                        .set_progress(100.0, &format!("Loaded {} rows, {} columns", rows, cols));
                    self.finish_loading();
                    should_keep_receiver = false;
                }
                LoadResult::Error(error) => {
                    tracing::error!(%error, "dataset load failed, keeping previous table");
                    self.control_panel.csv_path = Some(self.store.path().to_path_buf());
                    self.control_panel.set_progress(0.0, &format!("Error: {}", error));
                    self.finish_loading();
                    should_keep_receiver = false;
                }
            }
        }

        if should_keep_receiver {
            self.load_rx = Some(rx);
        }
    }

    fn finish_loading(&mut self) {
        self.is_loading = false;
        self.control_panel.busy = false;
    }

    fn handle_open_point_map(&mut self) {
        let Some(Ok(map)) = &self.chart_viewer.point_map else {
            return;
        };
        let html = map.to_html();
        self.open_in_browser(POINT_MAP_HTML, html);
    }

    fn handle_open_heatmap(&mut self) {
        let Some((_, Ok(RenderedView::HeatMap(heat)))) = &self.chart_viewer.view else {
            return;
        };
        let html = heat.to_html();
        self.open_in_browser(HEATMAP_HTML, html);
    }

    /// Write a map page next to the logs and hand it to the browser.
    fn open_in_browser(&mut self, file_name: &str, html: Result<String, RenderError>) {
        let target = self.settings.log_dir.join(file_name);
        let result = html.map_err(anyhow::Error::from).and_then(|html| {
            std::fs::create_dir_all(&self.settings.log_dir)?;
            std::fs::write(&target, html)?;
            open::that(&target)?;
            Ok(())
        });

        match result {
            Ok(()) => {
                tracing::info!(path = %target.display(), "map opened in browser");
                self.control_panel
                    .set_progress(100.0, &format!("Map written to {}", target.display()));
            }
            Err(e) => {
                tracing::error!(error = %e, "could not open map page");
                self.control_panel.set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }
}

/// Decode the header picture into a texture. A missing image is not fatal.
fn load_header_image(ctx: &egui::Context, path: &Path) -> Option<TextureHandle> {
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice());
            Some(ctx.load_texture("header_image", color_image, egui::TextureOptions::LINEAR))
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "header image not shown");
            None
        }
    }
}

impl eframe::App for CrimeExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        if self.needs_render && !self.is_loading {
            self.refresh_views();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::SelectionChanged => self.needs_render = true,
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            let action = self.chart_viewer.show(ui, self.header_image.as_ref());
            match action {
                ChartViewerAction::OpenPointMapInBrowser => self.handle_open_point_map(),
                ChartViewerAction::OpenHeatmapInBrowser => self.handle_open_heatmap(),
                ChartViewerAction::None => {}
            }
        });
    }
}
