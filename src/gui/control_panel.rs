//! Control Panel Widget
//! Left side panel with the data source and the visualization selector.

use crate::views::ViewSelection;
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Left side control panel with dataset controls and the view selector.
pub struct ControlPanel {
    pub selection: ViewSelection,
    pub csv_path: Option<PathBuf>,
    pub progress: f32,
    pub status: String,
    pub busy: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selection: ViewSelection::default(),
            csv_path: None,
            progress: 0.0,
            status: "Ready".to_string(),
            busy: false,
        }
    }
}

impl ControlPanel {
    pub fn new(csv_path: PathBuf) -> Self {
        Self {
            csv_path: Some(csv_path),
            ..Self::default()
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚓 Crime Explorer")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new("Toronto MCI 2014-2018").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Visualization Section =====
        ui.label(RichText::new("📊 Select Data Visualization").size(14.0).strong());
        ui.add_space(5.0);

        ComboBox::from_id_salt("view_selection")
            .width(220.0)
            .selected_text(self.selection.label())
            .show_ui(ui, |ui| {
                for selection in ViewSelection::ALL {
                    if ui
                        .selectable_label(self.selection == selection, selection.label())
                        .clicked()
                        && self.selection != selection
                    {
                        self.selection = selection;
                        action = ControlPanelAction::SelectionChanged;
                    }
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                let path_text = self
                    .csv_path
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "No file loaded".to_string());
                ui.label(RichText::new(&path_text).size(12.0));

                ui.add_enabled_ui(!self.busy, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("📂 Open…").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                        if ui.button("🔄 Reload").clicked() {
                            action = ControlPanelAction::Reload;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("⏳ Status").size(14.0).strong());
        ui.add_space(5.0);

        if self.busy {
            ui.add(egui::ProgressBar::new(self.progress / 100.0).animate(true));
            ui.add_space(5.0);
        }

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
    BrowseCsv,
    Reload,
}
