//! Shared map geometry: default camera and coordinate extraction.

use polars::prelude::*;

use crate::data::{columns, has_column};
use crate::error::{ConfigurationIssue, RenderError};

/// Default camera centre (central Toronto).
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 43.741667,
    lon: -79.373333,
};

/// Reference viewport used to turn a zoom level into a visible extent.
const VIEWPORT_PX: (f64, f64) = (1000.0, 600.0);
const TILE_PX: f64 = 256.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Map camera: centre plus web-map zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
}

impl MapView {
    pub fn new(zoom: u8) -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom,
        }
    }

    /// Visible (lon_span, lat_span) in degrees for the reference viewport.
    pub fn span(&self) -> (f64, f64) {
        let degrees_per_px = 360.0 / (TILE_PX * 2f64.powi(self.zoom as i32));
        let lon_span = degrees_per_px * VIEWPORT_PX.0;
        // Mercator shrinks latitude degrees by cos(lat)
        let lat_span = degrees_per_px * VIEWPORT_PX.1 * self.center.lat.to_radians().cos();
        (lon_span, lat_span)
    }

    /// (min_lon, max_lon, min_lat, max_lat)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let (lon_span, lat_span) = self.span();
        (
            self.center.lon - lon_span / 2.0,
            self.center.lon + lon_span / 2.0,
            self.center.lat - lat_span / 2.0,
            self.center.lat + lat_span / 2.0,
        )
    }
}

/// Require the coordinate columns for `view`.
pub fn require_coordinates(df: &DataFrame, view: &'static str) -> Result<(), RenderError> {
    for column in [columns::LONGITUDE, columns::LATITUDE] {
        if !has_column(df, column) {
            return Err(ConfigurationIssue::MissingColumn { view, column }.into());
        }
    }
    Ok(())
}

/// Per-row coordinates; `None` where either value is null or not finite.
pub fn coordinates(df: &DataFrame) -> Result<Vec<Option<GeoPoint>>, RenderError> {
    let lon = df.column(columns::LONGITUDE)?.cast(&DataType::Float64)?;
    let lat = df.column(columns::LATITUDE)?.cast(&DataType::Float64)?;

    let points = lon
        .f64()?
        .into_iter()
        .zip(lat.f64()?.into_iter())
        .map(|(x, y)| match (x, y) {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => {
                Some(GeoPoint { lat, lon })
            }
            _ => None,
        })
        .collect();
    Ok(points)
}
