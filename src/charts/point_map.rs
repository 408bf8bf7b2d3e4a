//! Point map: every incident at its coordinates, one trace per MCI category.

use polars::prelude::*;
use serde::Serialize;

use super::counts::MISSING_LABEL;
use super::ChartPlotter;
use super::geo::{self, GeoPoint, MapView};
use crate::data::{columns, has_column};
use crate::error::{ConfigurationIssue, RenderError};
use crate::tiles::TileCredential;

pub const POINT_MAP_ZOOM: u8 = 10;

const MAPBOX_ATTRIBUTION: &str = "© Mapbox © OpenStreetMap contributors";

/// One marker layer of the browser page.
#[derive(Serialize)]
struct MarkerLayer<'a> {
    name: &'a str,
    color: String,
    points: Vec<[f64; 2]>,
}
#[derive(Debug, Clone, PartialEq)]
pub struct PointTrace {
    pub category: String,
    pub points: Vec<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointMap {
    pub view: MapView,
    /// Categories in first-appearance order.
    pub traces: Vec<PointTrace>,
    /// Rows without usable coordinates.
    pub skipped: usize,
    /// Tile URL template with the access token attached.
    pub tile_url: String,
}

impl PointMap {
    /// Requires a usable tile credential; no fallback provider.
    pub fn build(df: &DataFrame, tiles: &TileCredential) -> Result<Self, RenderError> {
        tiles.ensure_usable()?;
        geo::require_coordinates(df, "Point map")?;
        if !has_column(df, columns::MCI) {
            return Err(ConfigurationIssue::MissingColumn {
                view: "Point map",
                column: columns::MCI,
            }
            .into());
        }

        let categories = df.column(columns::MCI)?.cast(&DataType::String)?;
        let coords = geo::coordinates(df)?;

        let mut traces: Vec<PointTrace> = Vec::new();
        let mut skipped = 0;
        for (category, point) in categories.str()?.into_iter().zip(coords) {
            let Some(point) = point else {
                skipped += 1;
                continue;
            };
            let category = category.unwrap_or(MISSING_LABEL);
            match traces.iter_mut().find(|t| t.category == category) {
                Some(trace) => trace.points.push(point),
                None => traces.push(PointTrace {
                    category: category.to_string(),
                    points: vec![point],
                }),
            }
        }

        tracing::debug!(traces = traces.len(), skipped, "point map built");

        Ok(Self {
            view: MapView::new(POINT_MAP_ZOOM),
            traces,
            skipped,
            tile_url: tiles.tile_url_template(),
        })
    }

    pub fn point_count(&self) -> usize {
        self.traces.iter().map(|t| t.points.len()).sum()
    }

    /// Standalone Leaflet page: the credential's tile layer under one
    /// toggleable marker layer per category, colored like the native plot.
    pub fn to_html(&self) -> Result<String, RenderError> {
        let layers: Vec<MarkerLayer> = self
            .traces
            .iter()
            .enumerate()
            .map(|(i, trace)| {
                let c = ChartPlotter::get_category_color(i);
                MarkerLayer {
                    name: &trace.category,
                    color: format!("#{:02x}{:02x}{:02x}", c.r(), c.g(), c.b()),
                    points: trace.points.iter().map(|p| [p.lat, p.lon]).collect(),
                }
            })
            .collect();
        let data = serde_json::to_string(&layers).map_err(|e| RenderError::Export(e.to_string()))?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<title>Point map</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map {{ width: 100%; height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map", {{ preferCanvas: true }}).setView([{lat}, {lon}], {zoom});
L.tileLayer("{tiles}", {{ attribution: "{attribution}", tileSize: 256 }}).addTo(map);
var overlays = {{}};
{data}.forEach(function (layer) {{
  var group = L.layerGroup(layer.points.map(function (p) {{
    return L.circleMarker(p, {{ radius: 3, stroke: false, fillColor: layer.color, fillOpacity: 0.7 }});
  }}));
  group.addTo(map);
  overlays[layer.name] = group;
}});
L.control.layers(null, overlays, {{ collapsed: false }}).addTo(map);
</script>
</body>
</html>
"#,
            lat = self.view.center.lat,
            lon = self.view.center.lon,
            zoom = self.view.zoom,
            tiles = self.tile_url,
            attribution = MAPBOX_ATTRIBUTION,
            data = data,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::fixture_store;
    use crate::tiles::CredentialStatus;

    fn token() -> TileCredential {
        TileCredential::new("pk.test-token").unwrap()
    }

    #[test]
    fn test_one_trace_per_category() {
        let (_file, store) = fixture_store();
        let map = PointMap::build(&store.table(), &token()).unwrap();

        let categories: Vec<&str> = map.traces.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(categories, vec!["Assault", "Break and Enter", "Robbery", "Theft Over"]);
        assert_eq!(map.point_count(), store.row_count());
        assert_eq!(map.skipped, 0);
        assert_eq!(map.view.zoom, 10);
    }

    #[test]
    fn test_markup_uses_tile_layer_and_one_layer_per_category() {
        let (_file, store) = fixture_store();
        let map = PointMap::build(&store.table(), &token()).unwrap();
        let html = map.to_html().unwrap();

        assert!(html.contains(&format!("L.tileLayer(\"{}\"", map.tile_url)));
        assert!(html.contains("access_token=pk.test-token"));
        assert!(html.contains("setView([43.741667, -79.373333], 10)"));
        for trace in &map.traces {
            assert!(html.contains(&format!("\"name\":\"{}\"", trace.category)));
        }
        assert_eq!(html.matches("\"color\":\"#").count(), map.traces.len());
        assert!(html.contains("[43.65,-79.35]"));
    }

    #[test]
    fn test_rejected_token_shows_no_map() {
        let (_file, store) = fixture_store();
        let tiles = token().with_status(CredentialStatus::Rejected("TokenInvalid".into()));

        let err = PointMap::build(&store.table(), &tiles).unwrap_err();
        assert!(matches!(err, RenderError::ExternalService(_)));
    }

    #[test]
    fn test_rows_without_coordinates_are_skipped() {
        let df = DataFrame::new(vec![
            Column::new("X".into(), vec![Some(-79.4), None]),
            Column::new("Y".into(), vec![Some(43.7), Some(43.6)]),
            Column::new("MCI".into(), vec!["Assault", "Robbery"]),
        ])
        .unwrap();

        let map = PointMap::build(&df, &token()).unwrap();
        assert_eq!(map.point_count(), 1);
        assert_eq!(map.skipped, 1);
    }
}
