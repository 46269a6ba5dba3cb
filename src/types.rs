use serde::{Deserialize, Serialize};

use crate::error::{GeorefError, Result};

/// Number of decimals kept on resolved geographic coordinates (~1.1 mm).
pub const COORDINATE_DECIMALS: i32 = 8;

/// Rings with fewer points than this are dropped before area computation.
pub const MIN_RING_POINTS: usize = 4;

/// Reference ellipsoid of the tile projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ellipsoid {
    Grs80,
    Wgs84,
}

impl Ellipsoid {
    /// Name understood by `+ellps=` in a proj string.
    pub fn proj_name(&self) -> &'static str {
        match self {
            Ellipsoid::Grs80 => "GRS80",
            Ellipsoid::Wgs84 => "WGS84",
        }
    }
}

/// Transverse-Mercator definition of one tile's projected coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParameters {
    pub reference_latitude_deg: f64,
    pub reference_longitude_deg: f64,
    pub false_easting_m: f64,
    pub false_northing_m: f64,
    pub scale_factor: f64,
    pub ellipsoid: Ellipsoid,
}

impl ProjectionParameters {
    /// GRS80 transverse Mercator with unit scale factor.
    pub fn new(
        reference_latitude_deg: f64,
        reference_longitude_deg: f64,
        false_easting_m: f64,
        false_northing_m: f64,
    ) -> Self {
        ProjectionParameters {
            reference_latitude_deg,
            reference_longitude_deg,
            false_easting_m,
            false_northing_m,
            scale_factor: 1.0,
            ellipsoid: Ellipsoid::Grs80,
        }
    }

    /// Reject parameters the inverse projection cannot work with.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("reference_latitude_deg", self.reference_latitude_deg),
            ("reference_longitude_deg", self.reference_longitude_deg),
            ("false_easting_m", self.false_easting_m),
            ("false_northing_m", self.false_northing_m),
            ("scale_factor", self.scale_factor),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(GeorefError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }

        if self.scale_factor <= 0.0 {
            return Err(GeorefError::InvalidParameter {
                name: "scale_factor",
                value: self.scale_factor,
                reason: "must be positive",
            });
        }

        if self.reference_latitude_deg.abs() > 90.0 {
            return Err(GeorefError::InvalidParameter {
                name: "reference_latitude_deg",
                value: self.reference_latitude_deg,
                reason: "must be within [-90, 90]",
            });
        }

        if self.reference_longitude_deg.abs() > 180.0 {
            return Err(GeorefError::InvalidParameter {
                name: "reference_longitude_deg",
                value: self.reference_longitude_deg,
                reason: "must be within [-180, 180]",
            });
        }

        Ok(())
    }

    /// Render as a proj string, e.g. `+proj=tmerc +lat_0=38 +lon_0=127 ...`.
    pub fn to_proj_string(&self) -> String {
        format!(
            "+proj=tmerc +lat_0={} +lon_0={} +k={} +x_0={} +y_0={} +ellps={} +units=m +no_defs",
            self.reference_latitude_deg,
            self.reference_longitude_deg,
            self.scale_factor,
            self.false_easting_m,
            self.false_northing_m,
            self.ellipsoid.proj_name()
        )
    }
}

/// Projection plus the tile's own placement and ground sampling distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMetadata {
    pub projection: ProjectionParameters,
    /// Projected coordinate of the tile center
    pub tile_easting_m: f64,
    pub tile_northing_m: f64,
    /// Ground size of one (square, axis-aligned) pixel edge
    pub pixel_resolution_m: f64,
}

impl TileMetadata {
    pub fn validate(&self) -> Result<()> {
        self.projection.validate()?;

        for (name, value) in [
            ("tile_easting_m", self.tile_easting_m),
            ("tile_northing_m", self.tile_northing_m),
        ] {
            if !value.is_finite() {
                return Err(GeorefError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }

        if !self.pixel_resolution_m.is_finite() || self.pixel_resolution_m <= 0.0 {
            return Err(GeorefError::InvalidParameter {
                name: "pixel_resolution_m",
                value: self.pixel_resolution_m,
                reason: "must be a positive ground distance",
            });
        }

        Ok(())
    }
}

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl GeoPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        GeoPoint { latitude_deg, longitude_deg }
    }

    /// Round each axis independently to [`COORDINATE_DECIMALS`].
    pub fn rounded(self) -> Self {
        GeoPoint {
            latitude_deg: round_decimals(self.latitude_deg, COORDINATE_DECIMALS),
            longitude_deg: round_decimals(self.longitude_deg, COORDINATE_DECIMALS),
        }
    }
}

pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Image coordinate: origin top-left, +x east, +y south.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        PixelPoint { x, y }
    }
}

/// Width and height of a raster in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterDimensions {
    pub width: u32,
    pub height: u32,
}

impl RasterDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        RasterDimensions { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A pixel-space polygon drawn on a tile.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationPolygon {
    pub ring: Vec<PixelPoint>,
    pub centroid: PixelPoint,
}

impl AnnotationPolygon {
    /// Build from a ring; the centroid is the per-axis mean of its vertices.
    pub fn from_ring(ring: Vec<PixelPoint>) -> Self {
        let centroid = mean_point(&ring);
        AnnotationPolygon { ring, centroid }
    }

    /// Build from the parallel x/y sequences annotation tools emit.
    pub fn from_parallel(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.len() != ys.len() {
            return None;
        }
        let ring = xs.iter().zip(ys).map(|(&x, &y)| PixelPoint::new(x, y)).collect();
        Some(Self::from_ring(ring))
    }
}

/// Arithmetic mean of the x's and y's, taken independently.
///
/// This is not the area centroid of the polygon; vertex-dense edges pull
/// the point toward them. Output values depend on this exact definition.
pub fn mean_point(ring: &[PixelPoint]) -> PixelPoint {
    if ring.is_empty() {
        return PixelPoint::new(f64::NAN, f64::NAN);
    }
    let n = ring.len() as f64;
    let (sx, sy) = ring.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    PixelPoint::new(sx / n, sy / n)
}

/// A polygon mapped to geographic space, with its ground area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoreferencedPolygon {
    pub ring: Vec<GeoPoint>,
    pub centroid: GeoPoint,
    pub area_m2: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_point_is_per_axis_average() {
        let ring = vec![
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(10.0, 0.0),
            PixelPoint::new(10.0, 10.0),
            PixelPoint::new(0.0, 10.0),
            PixelPoint::new(0.0, 5.0),
        ];
        let c = mean_point(&ring);
        assert!((c.x - 4.0).abs() < 1e-12);
        assert!((c.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_parallel_rejects_length_mismatch() {
        assert!(AnnotationPolygon::from_parallel(&[1.0, 2.0], &[1.0]).is_none());

        let polygon = AnnotationPolygon::from_parallel(&[1.0, 3.0], &[2.0, 4.0]).unwrap();
        assert_eq!(polygon.ring.len(), 2);
        assert_eq!(polygon.centroid, PixelPoint::new(2.0, 3.0));
    }

    #[test]
    fn test_rounding_to_eight_decimals() {
        let p = GeoPoint::new(36.123456789012, 127.987654321098).rounded();
        assert_eq!(p.latitude_deg, 36.12345679);
        assert_eq!(p.longitude_deg, 127.98765432);
    }

    #[test]
    fn test_validate_rejects_non_positive_scale() {
        let mut params = ProjectionParameters::new(38.0, 127.0, 200000.0, 600000.0);
        assert!(params.validate().is_ok());

        params.scale_factor = 0.0;
        assert!(matches!(
            params.validate(),
            Err(GeorefError::InvalidParameter { name: "scale_factor", .. })
        ));

        params.scale_factor = 1.0;
        params.reference_latitude_deg = f64::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_tile_validate_rejects_bad_resolution() {
        let tile = TileMetadata {
            projection: ProjectionParameters::new(38.0, 127.0, 200000.0, 600000.0),
            tile_easting_m: 228580.0,
            tile_northing_m: 419031.0,
            pixel_resolution_m: -0.11,
        };
        assert!(tile.validate().is_err());
    }

    #[test]
    fn test_proj_string() {
        let params = ProjectionParameters::new(38.0, 127.0, 200000.0, 600000.0);
        assert_eq!(
            params.to_proj_string(),
            "+proj=tmerc +lat_0=38 +lon_0=127 +k=1 +x_0=200000 +y_0=600000 +ellps=GRS80 +units=m +no_defs"
        );
    }
}
