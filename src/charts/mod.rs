//! Charts module - chart models and their rendering

mod counts;
pub mod geo;
mod heatmap;
mod plotter;
mod point_map;
mod renderer;

pub use counts::CountChart;
pub use heatmap::HeatMap;
pub use plotter::ChartPlotter;
pub use point_map::PointMap;
pub use renderer::StaticChartRenderer;
