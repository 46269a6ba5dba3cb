use geo::{Area, LineString, Polygon};

use crate::crs::{CoordinateSystemProvider, UtmZone};
use crate::displacement::{origin_from_center, point_from_origin};
use crate::error::Result;
use crate::projection_resolver::resolve_tile;
use crate::types::{
    AnnotationPolygon, GeoPoint, GeoreferencedPolygon, RasterDimensions, TileMetadata, MIN_RING_POINTS,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionOptions {
    /// Rings shorter than this are dropped from the output
    pub min_ring_points: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        ConversionOptions {
            min_ring_points: MIN_RING_POINTS,
        }
    }
}

/// Geographic anchoring of one tile: its resolved center and top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileFrame {
    pub center: GeoPoint,
    pub origin: GeoPoint,
    pub resolution_m: f64,
    pub area_zone: UtmZone,
}

impl TileFrame {
    /// Resolve the tile center and derive the origin from the actual raster size.
    pub fn resolve(
        provider: &dyn CoordinateSystemProvider,
        tile: &TileMetadata,
        dimensions: RasterDimensions,
    ) -> Result<TileFrame> {
        let center = resolve_tile(provider, tile)?;
        let origin = origin_from_center(center, dimensions, tile.pixel_resolution_m);

        log::debug!(
            "Tile {}x{} px: center {}, origin {}",
            dimensions.width,
            dimensions.height,
            crate::utils::format_coordinate(center),
            crate::utils::format_coordinate(origin)
        );

        Ok(TileFrame {
            center,
            origin,
            resolution_m: tile.pixel_resolution_m,
            area_zone: UtmZone::containing(center),
        })
    }

    /// Map a polygon's ring and centroid into geographic space (no area).
    pub fn locate(&self, polygon: &AnnotationPolygon) -> (Vec<GeoPoint>, GeoPoint) {
        let ring = polygon
            .ring
            .iter()
            .map(|&p| point_from_origin(p, self.origin, self.resolution_m))
            .collect();
        let centroid = point_from_origin(polygon.centroid, self.origin, self.resolution_m);
        (ring, centroid)
    }
}

/// Ground area in m² of a geographic ring, measured in a UTM plane.
pub fn polygon_area(provider: &dyn CoordinateSystemProvider, ring: &[GeoPoint], zone: UtmZone) -> Result<f64> {
    let planar = provider.reproject(ring, zone)?;
    Ok(planar_area(planar))
}

/// Shoelace area of an open or closed planar ring, independent of winding.
pub fn planar_area(points: Vec<(f64, f64)>) -> f64 {
    Polygon::new(LineString::from(points), vec![]).unsigned_area()
}

/// Georeference every annotation polygon of one tile.
///
/// Polygons with fewer than `min_ring_points` vertices are left out of the
/// result entirely; the survivors keep their input order.
pub fn georeference(
    provider: &dyn CoordinateSystemProvider,
    tile: &TileMetadata,
    dimensions: RasterDimensions,
    polygons: &[AnnotationPolygon],
    options: ConversionOptions,
) -> Result<Vec<GeoreferencedPolygon>> {
    let frame = TileFrame::resolve(provider, tile, dimensions)?;

    let mut output = Vec::with_capacity(polygons.len());
    for (index, polygon) in polygons.iter().enumerate() {
        if polygon.ring.len() < options.min_ring_points {
            log::debug!("Dropping polygon {} with {} points", index, polygon.ring.len());
            continue;
        }

        let (ring, centroid) = frame.locate(polygon);
        let area_m2 = polygon_area(provider, &ring, frame.area_zone)?;
        output.push(GeoreferencedPolygon { ring, centroid, area_m2 });
    }

    log::info!(
        "Georeferenced {} of {} polygons ({} total)",
        output.len(),
        polygons.len(),
        crate::utils::format_area(output.iter().map(|p| p.area_m2).sum())
    );

    Ok(output)
}
