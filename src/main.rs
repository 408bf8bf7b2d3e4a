//! Crime Explorer - Toronto major crime indicators dashboard
//!
//! CLI commands:
//! - gui: Interactive dashboard (default)
//! - export: Write one view to a file (count chart as PNG, heat map as HTML)
//! - summary: Print the table shape and its first rows

mod charts;
mod config;
mod data;
mod error;
mod gui;
mod logging;
mod tiles;
mod views;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use charts::StaticChartRenderer;
use config::{Secrets, Settings};
use data::IncidentStore;
use gui::CrimeExplorerApp;
use tiles::TileCredential;
use views::{RenderedView, ViewDispatcher, ViewSelection};

#[derive(Parser)]
#[command(name = "crime_explorer")]
#[command(about = "Toronto crime data exploration: maps and count charts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Incident CSV, overrides data_path from the config
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Map tile token, overrides MAPBOX_TOKEN
    #[arg(long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the dashboard window
    Gui,

    /// Render one view to a file
    Export {
        /// View to render
        #[arg(short, long, value_enum)]
        view: ViewSelection,

        /// Output file (.png for count charts, .html for the heat map)
        #[arg(short, long)]
        output: PathBuf,

        /// PNG width in pixels
        #[arg(long, default_value = "1400", value_parser = clap::value_parser!(u32).range(1..=8192))]
        width: u32,

        /// PNG height in pixels
        #[arg(long, default_value = "900", value_parser = clap::value_parser!(u32).range(1..=8192))]
        height: u32,
    },

    /// Print row count, shape and the first rows
    Summary {
        #[arg(short = 'n', long, default_value = "5")]
        rows: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load_or_default(&cli.config)?;
    if let Some(data) = cli.data {
        settings.data_path = data;
    }

    let _log_guard = logging::init_logging(&settings.log_dir)?;
    tracing::info!("Crime Explorer starting up");
    tracing::debug!("Settings: {:?}", settings);

    // No token, no start
    let secrets = Secrets::load();
    let mut tiles = secrets.tile_credential(cli.token.as_deref())?;

    let command = cli.command.unwrap_or(Commands::Gui);
    if settings.verify_token && matches!(command, Commands::Gui) {
        // Failures surface later as the point map's error
        tiles.verify();
    }

    let store = IncidentStore::open(&settings.data_path)?;

    match command {
        Commands::Gui => run_gui(store, tiles, settings)?,
        Commands::Export {
            view,
            output,
            width,
            height,
        } => export_view(&store, &tiles, view, &output, width, height)?,
        Commands::Summary { rows } => print_summary(&store, rows),
    }

    Ok(())
}

fn run_gui(store: IncidentStore, tiles: TileCredential, settings: Settings) -> anyhow::Result<()> {
    tracing::info!("Launching dashboard");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Toronto Crimes Data Exploration"),
        ..Default::default()
    };

    eframe::run_native(
        "Crime Explorer",
        options,
        Box::new(|cc| Ok(Box::new(CrimeExplorerApp::new(cc, store, tiles, settings)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

fn export_view(
    store: &IncidentStore,
    tiles: &TileCredential,
    selection: ViewSelection,
    output: &Path,
    width: u32,
    height: u32,
) -> anyhow::Result<()> {
    let dispatcher = ViewDispatcher::new(store, tiles);

    match dispatcher.render(selection)? {
        RenderedView::Nothing => {
            anyhow::bail!("view '{}' has nothing to export", selection.label());
        }
        RenderedView::HeatMap(heat) => {
            std::fs::write(output, heat.to_html()?)?;
            tracing::info!(
                path = %output.display(),
                rows_used = heat.rows_used,
                rows_total = heat.rows_total,
                "heat map exported"
            );
        }
        RenderedView::Count(chart) => {
            StaticChartRenderer::save_count_chart_png(&chart, output, width, height)?;
        }
    }

    println!("Wrote {}", output.display());
    Ok(())
}

fn print_summary(store: &IncidentStore, rows: usize) {
    let (height, width) = store.shape();
    tracing::info!(rows = height, columns = width, path = %store.path().display(), "summary");

    println!("Source: {}", store.path().display());
    println!("Shape: ({}, {})", height, width);
    println!("{}", store.preview(rows));
}
