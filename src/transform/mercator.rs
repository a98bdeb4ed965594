use super::CoordinateTransform;
use crate::core::{DirtyRegionError, Result};
use geo_types::{Coord, coord};
use std::f64::consts::FRAC_PI_4;

/// Semi-major axis of the WGS84 ellipsoid, used as the sphere radius
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which spherical Mercator maps to a square world
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// Geographic longitude/latitude (degrees) to spherical Web Mercator metres.
///
/// Latitudes beyond the Mercator limit are clamped so polar extents stay finite.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeographicToWebMercator;

impl CoordinateTransform for GeographicToWebMercator {
    fn name(&self) -> &str {
        "geographic-to-web-mercator"
    }

    fn transform(&self, point: Coord<f64>) -> Result<Coord<f64>> {
        if !(-180.0..=180.0).contains(&point.x) || !(-90.0..=90.0).contains(&point.y) {
            return Err(DirtyRegionError::Transform(format!(
                "coordinate ({}, {}) is outside the geographic domain",
                point.x, point.y
            )));
        }
        let lat = point.y.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
        Ok(coord! {
            x: EARTH_RADIUS * point.x.to_radians(),
            y: EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
        })
    }
}

/// Spherical Web Mercator metres back to geographic degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercatorToGeographic;

impl CoordinateTransform for WebMercatorToGeographic {
    fn name(&self) -> &str {
        "web-mercator-to-geographic"
    }

    fn transform(&self, point: Coord<f64>) -> Result<Coord<f64>> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(DirtyRegionError::Transform(format!(
                "non-finite mercator coordinate ({}, {})",
                point.x, point.y
            )));
        }
        let lon = (point.x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (point.y / EARTH_RADIUS).exp().atan() - 2.0 * FRAC_PI_4).to_degrees();
        Ok(coord! { x: lon, y: lat })
    }
}
