//! Heat Map Module
//! Density overlay over the first rows of the table, plus inline Leaflet markup.

use polars::prelude::*;

use super::geo::{self, GeoPoint, MapView};
use crate::error::RenderError;

pub const HEATMAP_ZOOM: u8 = 11;
const GRID_CELLS: usize = 120;

const TONER_TILES: &str = "https://tiles.stadiamaps.com/tiles/stamen_toner/{z}/{x}/{y}.png";
const TONER_ATTRIBUTION: &str = "Map tiles by Stamen Design, under CC BY 4.0. Data by OpenStreetMap, under ODbL.";

/// Binned point counts over the heat map camera extent.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    /// (min_lon, max_lon, min_lat, max_lat)
    pub bounds: (f64, f64, f64, f64),
    pub cols: usize,
    pub rows: usize,
    /// Row-major, row 0 at min_lat.
    pub cells: Vec<u32>,
}

impl DensityGrid {
    fn build(view: &MapView, points: &[GeoPoint], cols: usize, rows: usize) -> Self {
        let bounds = view.bounds();
        let (min_lon, max_lon, min_lat, max_lat) = bounds;
        let mut cells = vec![0u32; cols * rows];

        for p in points {
            if p.lon < min_lon || p.lon >= max_lon || p.lat < min_lat || p.lat >= max_lat {
                continue;
            }
            let c = (((p.lon - min_lon) / (max_lon - min_lon)) * cols as f64) as usize;
            let r = (((p.lat - min_lat) / (max_lat - min_lat)) * rows as f64) as usize;
            cells[r.min(rows - 1) * cols + c.min(cols - 1)] += 1;
        }

        Self {
            bounds,
            cols,
            rows,
            cells,
        }
    }

    pub fn max(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Centre of a cell as (lon, lat).
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        let (min_lon, max_lon, min_lat, max_lat) = self.bounds;
        let w = (max_lon - min_lon) / self.cols as f64;
        let h = (max_lat - min_lat) / self.rows as f64;
        (
            min_lon + (col as f64 + 0.5) * w,
            min_lat + (row as f64 + 0.5) * h,
        )
    }

    /// Non-empty cells as (col, row, count).
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &n)| n > 0)
            .map(|(i, &n)| (i % self.cols, i / self.cols, n))
    }
}

/// Heat map over a row-capped prefix of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMap {
    pub view: MapView,
    pub points: Vec<GeoPoint>,
    /// Rows taken from the head of the table (at most the cap).
    pub rows_used: usize,
    pub rows_total: usize,
    pub grid: DensityGrid,
}

impl HeatMap {
    /// Build from the first `row_cap` rows; later rows are ignored.
    pub fn build(df: &DataFrame, row_cap: usize) -> Result<Self, RenderError> {
        geo::require_coordinates(df, "Heatmap")?;

        let rows_total = df.height();
        let prefix = df.head(Some(row_cap));
        let rows_used = prefix.height();

        let points: Vec<GeoPoint> = geo::coordinates(&prefix)?.into_iter().flatten().collect();
        let view = MapView::new(HEATMAP_ZOOM);
        let grid = DensityGrid::build(&view, &points, GRID_CELLS, GRID_CELLS);

        if rows_total > rows_used {
            tracing::info!(
                rows_used,
                rows_total,
                "heat map limited to the first {} rows",
                row_cap
            );
        }

        Ok(Self {
            view,
            points,
            rows_used,
            rows_total,
            grid,
        })
    }

    pub fn is_truncated(&self) -> bool {
        self.rows_total > self.rows_used
    }

    /// Standalone Leaflet page with a leaflet.heat layer.
    pub fn to_html(&self) -> Result<String, RenderError> {
        let latlngs: Vec<[f64; 2]> = self.points.iter().map(|p| [p.lat, p.lon]).collect();
        let data = serde_json::to_string(&latlngs).map_err(|e| RenderError::Export(e.to_string()))?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<title>Heatmap</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js"></script>
<style>html, body, #map {{ width: 100%; height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView([{lat}, {lon}], {zoom});
L.control.scale().addTo(map);
L.tileLayer("{tiles}", {{ attribution: "{attribution}" }}).addTo(map);
L.heatLayer({data}).addTo(map);
</script>
</body>
</html>
"#,
            lat = self.view.center.lat,
            lon = self.view.center.lon,
            zoom = self.view.zoom,
            tiles = TONER_TILES,
            attribution = TONER_ATTRIBUTION,
            data = data,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::HEATMAP_ROW_CAP;

    fn table(rows: usize) -> DataFrame {
        // Points walk diagonally across the camera extent
        let xs: Vec<f64> = (0..rows).map(|i| -79.45 + (i % 100) as f64 * 0.001).collect();
        let ys: Vec<f64> = (0..rows).map(|i| 43.70 + (i % 100) as f64 * 0.0005).collect();
        DataFrame::new(vec![Column::new("X".into(), xs), Column::new("Y".into(), ys)]).unwrap()
    }

    #[test]
    fn test_small_table_uses_every_row() {
        let heat = HeatMap::build(&table(1_234), HEATMAP_ROW_CAP).unwrap();
        assert_eq!(heat.rows_used, 1_234);
        assert_eq!(heat.points.len(), 1_234);
        assert!(!heat.is_truncated());
    }

    #[test]
    fn test_exactly_cap_rows_is_not_truncated() {
        let heat = HeatMap::build(&table(HEATMAP_ROW_CAP), HEATMAP_ROW_CAP).unwrap();
        assert_eq!(heat.rows_used, HEATMAP_ROW_CAP);
        assert!(!heat.is_truncated());
    }

    #[test]
    fn test_large_table_uses_exactly_the_prefix() {
        let mut df = table(HEATMAP_ROW_CAP);
        // Rows past the cap sit far outside Toronto and must not show up
        let tail = DataFrame::new(vec![
            Column::new("X".into(), vec![10.0f64; 500]),
            Column::new("Y".into(), vec![50.0f64; 500]),
        ])
        .unwrap();
        df.vstack_mut(&tail).unwrap();

        let heat = HeatMap::build(&df, HEATMAP_ROW_CAP).unwrap();
        assert_eq!(heat.rows_total, HEATMAP_ROW_CAP + 500);
        assert_eq!(heat.rows_used, HEATMAP_ROW_CAP);
        assert_eq!(heat.points.len(), HEATMAP_ROW_CAP);
        assert!(heat.points.iter().all(|p| p.lon < 0.0));
        assert!(heat.is_truncated());
    }

    #[test]
    fn test_grid_counts_points_inside_extent() {
        let heat = HeatMap::build(&table(300), HEATMAP_ROW_CAP).unwrap();
        let binned: u32 = heat.grid.cells.iter().sum();
        assert_eq!(binned, 300);
        assert_eq!(heat.grid.occupied().map(|(_, _, n)| n).sum::<u32>(), 300);
        assert!(heat.grid.max() >= 3);
    }

    #[test]
    fn test_markup_embeds_points_and_camera() {
        let heat = HeatMap::build(&table(2), HEATMAP_ROW_CAP).unwrap();
        let html = heat.to_html().unwrap();
        assert!(html.contains("L.heatLayer([[43.7,-79.45],"));
        assert_eq!(html.matches("],[").count(), 1);
        assert!(html.contains("setView([43.741667, -79.373333], 11)"));
    }

    #[test]
    fn test_missing_coordinates_is_configuration_error() {
        let df = DataFrame::new(vec![Column::new("X".into(), vec![1.0f64])]).unwrap();
        let err = HeatMap::build(&df, HEATMAP_ROW_CAP).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }
}
