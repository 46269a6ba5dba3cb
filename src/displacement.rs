use crate::types::{GeoPoint, PixelPoint, RasterDimensions};

/// Meters per degree of latitude, held constant over the globe.
pub const EARTH_UNIT_LENGTH_M: f64 = 111_320.0;

/// Move `from` by a pixel offset on a locally flat Earth.
///
/// Pixel +x is east and pixel +y is south, so the y offset is negated into a
/// north-positive latitude delta. The longitude scale uses the departure
/// latitude. Not valid near the poles: `cos(lat)` goes to zero there and the
/// longitude delta is unbounded.
pub fn displace(dx_px: f64, dy_px: f64, from: GeoPoint, resolution_m: f64) -> GeoPoint {
    let dx_m = dx_px * resolution_m;
    let dy_m = -dy_px * resolution_m;

    let d_lat = dy_m / EARTH_UNIT_LENGTH_M;
    let d_lon = dx_m / (EARTH_UNIT_LENGTH_M * from.latitude_deg.to_radians().cos());

    GeoPoint::new(from.latitude_deg + d_lat, from.longitude_deg + d_lon)
}

/// Offset from the center pixel to the top-left corner.
///
/// Integer (floor) halves: an odd dimension leaves the origin up to half a
/// pixel off the exact corner.
pub fn half_extent(dimensions: RasterDimensions) -> (u32, u32) {
    (dimensions.width / 2, dimensions.height / 2)
}

/// Geographic position of the tile's top-left pixel.
pub fn origin_from_center(center: GeoPoint, dimensions: RasterDimensions, resolution_m: f64) -> GeoPoint {
    let (half_w, half_h) = half_extent(dimensions);
    displace(-(half_w as f64), -(half_h as f64), center, resolution_m)
}

/// Geographic position of an arbitrary pixel, measured from the tile origin.
pub fn point_from_origin(pixel: PixelPoint, origin: GeoPoint, resolution_m: f64) -> GeoPoint {
    displace(pixel.x, pixel.y, origin, resolution_m)
}
