//! Views module - sidebar selection and dispatch to the chart builders

mod dispatcher;
mod selection;

pub use dispatcher::{RenderedView, ViewDispatcher};
pub use selection::{BarColors, CountSpec, Orientation, ViewSelection, ViewSpec, HEATMAP_ROW_CAP};
