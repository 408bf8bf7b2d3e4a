//! View Dispatcher
//! Turns the current selection plus the shared table into one rendered view.

use crate::charts::{CountChart, HeatMap, PointMap};
use crate::data::IncidentStore;
use crate::error::RenderError;
use crate::tiles::TileCredential;

use super::{ViewSelection, ViewSpec};

/// Result of one render cycle for the selected view.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedView {
    Nothing,
    HeatMap(HeatMap),
    Count(CountChart),
}

/// Stateless: every call looks only at the store and the selection it is given.
pub struct ViewDispatcher<'a> {
    store: &'a IncidentStore,
    tiles: &'a TileCredential,
}

impl<'a> ViewDispatcher<'a> {
    pub fn new(store: &'a IncidentStore, tiles: &'a TileCredential) -> Self {
        Self { store, tiles }
    }

    /// The always-visible point map.
    pub fn point_map(&self) -> Result<PointMap, RenderError> {
        PointMap::build(&self.store.table(), self.tiles)
    }

    /// Render the chart for `selection`. Errors abort this cycle only.
    pub fn render(&self, selection: ViewSelection) -> Result<RenderedView, RenderError> {
        let _span = tracing::debug_span!("render", view = %selection).entered();
        let table = self.store.table();

        let view = match selection.spec() {
            ViewSpec::Nothing => RenderedView::Nothing,
            ViewSpec::HeatMap { row_cap } => RenderedView::HeatMap(HeatMap::build(&table, row_cap)?),
            ViewSpec::Count(spec) => RenderedView::Count(CountChart::build(&table, &spec)?),
        };

        tracing::debug!("view rendered");
        Ok(view)
    }
}
