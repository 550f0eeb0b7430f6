//! Geographic vs projected coordinate detection.
//!
//! Boundaries arrive either in degrees (WGS84-ish lon/lat) or already in
//! meters. The frame is resolved once from the boundary bounding box and then
//! threaded through every area, length and distance computation so that a
//! single call never mixes units. The degree conversion is a local
//! equirectangular approximation around the boundary's center latitude.

use geo::{Coord, Line, LineString, Polygon, Rect};
use serde::Serialize;

use crate::config::{
    GEOGRAPHIC_KEY_SCALE, GEOGRAPHIC_MAX_EXTENT_DEG, MAX_LATITUDE, MAX_LONGITUDE, METERS_PER_DEGREE,
    PROJECTED_KEY_SCALE,
};

/// Unit system of the input coordinates plus degree->meter factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoordinateFrame {
    pub is_geographic: bool,
    pub lat_meters_per_degree: f64,
    pub lon_meters_per_degree: f64,
}

impl Default for CoordinateFrame {
    fn default() -> Self {
        Self::projected()
    }
}

impl CoordinateFrame {
    /// Frame for coordinates that are already in meters.
    pub fn projected() -> Self {
        Self {
            is_geographic: false,
            lat_meters_per_degree: 1.0,
            lon_meters_per_degree: 1.0,
        }
    }

    /// Frame for degree coordinates centered on `center_lat`.
    pub fn geographic(center_lat: f64) -> Self {
        Self {
            is_geographic: true,
            lat_meters_per_degree: METERS_PER_DEGREE,
            lon_meters_per_degree: METERS_PER_DEGREE * center_lat.to_radians().cos(),
        }
    }

    /// Classify a bounding box. Anything that does not look like a small
    /// lon/lat extent is treated as projected.
    pub fn resolve(bounds: &Rect<f64>) -> Self {
        let min = bounds.min();
        let width = bounds.width();
        let height = bounds.height();
        let looks_geographic = width < GEOGRAPHIC_MAX_EXTENT_DEG
            && height < GEOGRAPHIC_MAX_EXTENT_DEG
            && min.x.abs() < MAX_LONGITUDE
            && min.y.abs() < MAX_LATITUDE;
        if looks_geographic {
            Self::geographic(bounds.center().y)
        } else {
            Self::projected()
        }
    }

    /// Mean of the two axis factors, used to turn metric thresholds into
    /// native distances.
    pub fn mean_meters_per_unit(&self) -> f64 {
        (self.lat_meters_per_degree + self.lon_meters_per_degree) / 2.0
    }

    pub fn meters_to_native(&self, meters: f64) -> f64 {
        let factor = self.mean_meters_per_unit();
        if factor <= 0.0 {
            return meters;
        }
        meters / factor
    }

    pub fn native_to_meters(&self, native: f64) -> f64 {
        native * self.mean_meters_per_unit()
    }

    /// Native `(x, y)` extents covering `meters` along each axis. Unlike
    /// [`meters_to_native`](Self::meters_to_native) this never undershoots
    /// the shorter longitude degree.
    pub fn axis_margins(&self, meters: f64) -> (f64, f64) {
        let per_axis = |factor: f64| if factor > 0.0 { meters / factor } else { meters };
        (per_axis(self.lon_meters_per_degree), per_axis(self.lat_meters_per_degree))
    }

    /// Coordinate scaled to meters on both axes, so Euclidean distances in
    /// the result are metric.
    pub fn to_metric(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: c.x * self.lon_meters_per_degree,
            y: c.y * self.lat_meters_per_degree,
        }
    }

    /// Scale for [`coord_key`](crate::geometry::coord_key) so that vertex
    /// keys resolve to roughly a decimeter in either frame.
    pub fn key_scale(&self) -> f64 {
        if self.is_geographic {
            GEOGRAPHIC_KEY_SCALE
        } else {
            PROJECTED_KEY_SCALE
        }
    }

    pub fn area_to_m2(&self, native_area: f64) -> f64 {
        native_area * self.lat_meters_per_degree * self.lon_meters_per_degree
    }

    /// Width and height of a rectangle in meters.
    pub fn extent_m(&self, bounds: &Rect<f64>) -> (f64, f64) {
        (
            bounds.width() * self.lon_meters_per_degree,
            bounds.height() * self.lat_meters_per_degree,
        )
    }

    pub fn line_length_m(&self, line: &Line<f64>) -> f64 {
        self.distance_m(line.start, line.end)
    }

    pub fn distance_m(&self, a: Coord<f64>, b: Coord<f64>) -> f64 {
        let dx = (b.x - a.x) * self.lon_meters_per_degree;
        let dy = (b.y - a.y) * self.lat_meters_per_degree;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn line_string_length_m(&self, line_string: &LineString<f64>) -> f64 {
        line_string.lines().map(|l| self.line_length_m(&l)).sum()
    }

    /// Exterior plus interior ring lengths.
    pub fn perimeter_m(&self, polygon: &Polygon<f64>) -> f64 {
        self.line_string_length_m(polygon.exterior())
            + polygon
                .interiors()
                .iter()
                .map(|ring| self.line_string_length_m(ring))
                .sum::<f64>()
    }
}
