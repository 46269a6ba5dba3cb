use proj4rs::Proj;

use crate::error::{GeorefError, Result};
use crate::types::{GeoPoint, ProjectionParameters};

/// Geographic lon/lat of the annotation output.
const WGS84_LONGLAT: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Locally flat metric plane used for area computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    pub zone: u8,
    pub south: bool,
}

impl UtmZone {
    /// Zone whose 6° longitude band contains `point`.
    pub fn containing(point: GeoPoint) -> UtmZone {
        let zone = (((point.longitude_deg + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;
        UtmZone {
            zone,
            south: point.latitude_deg < 0.0,
        }
    }

    pub fn epsg(&self) -> u32 {
        if self.south {
            32700 + self.zone as u32
        } else {
            32600 + self.zone as u32
        }
    }

    pub fn to_proj_string(&self) -> String {
        let south = if self.south { " +south" } else { "" };
        format!("+proj=utm +zone={}{} +datum=WGS84 +units=m +no_defs", self.zone, south)
    }
}

/// Projection capability the resolver and the area step depend on.
///
/// `forward`/`inverse` work in the tile's transverse-Mercator definition,
/// `reproject` takes WGS84 degrees to planar meters in a UTM zone.
pub trait CoordinateSystemProvider {
    /// Geographic point to projected `(easting, northing)` in meters.
    fn forward(&self, params: &ProjectionParameters, point: GeoPoint) -> Result<(f64, f64)>;

    /// Projected `(easting, northing)` to an unrounded geographic point.
    fn inverse(&self, params: &ProjectionParameters, easting_m: f64, northing_m: f64) -> Result<GeoPoint>;

    /// Geographic ring to planar `(x, y)` meters.
    fn reproject(&self, ring: &[GeoPoint], target: UtmZone) -> Result<Vec<(f64, f64)>>;
}

/// [`CoordinateSystemProvider`] backed by proj4rs.
pub struct Proj4Provider {
    wgs84: Proj,
}

impl Proj4Provider {
    pub fn new() -> Result<Proj4Provider> {
        Ok(Proj4Provider {
            wgs84: build_proj(WGS84_LONGLAT)?,
        })
    }

    fn tile_projections(&self, params: &ProjectionParameters) -> Result<(Proj, Proj)> {
        params.validate()?;

        let tm_proj_string = params.to_proj_string();
        log::debug!("Creating tile projection '{}'", tm_proj_string);

        let geographic = build_proj(&format!(
            "+proj=longlat +ellps={} +no_defs",
            params.ellipsoid.proj_name()
        ))?;
        let tm = build_proj(&tm_proj_string)?;
        Ok((geographic, tm))
    }
}

impl CoordinateSystemProvider for Proj4Provider {
    fn forward(&self, params: &ProjectionParameters, point: GeoPoint) -> Result<(f64, f64)> {
        let (geographic, tm) = self.tile_projections(params)?;

        let mut xyz = (point.longitude_deg.to_radians(), point.latitude_deg.to_radians(), 0.0);
        proj4rs::transform::transform(&geographic, &tm, &mut xyz)
            .map_err(|e| GeorefError::Projection(format!("forward transverse Mercator failed: {:?}", e)))?;

        Ok((xyz.0, xyz.1))
    }

    fn inverse(&self, params: &ProjectionParameters, easting_m: f64, northing_m: f64) -> Result<GeoPoint> {
        let (geographic, tm) = self.tile_projections(params)?;

        let mut xyz = (easting_m, northing_m, 0.0);
        proj4rs::transform::transform(&tm, &geographic, &mut xyz)
            .map_err(|e| GeorefError::Projection(format!("inverse transverse Mercator failed: {:?}", e)))?;

        Ok(GeoPoint::new(xyz.1.to_degrees(), xyz.0.to_degrees()))
    }

    fn reproject(&self, ring: &[GeoPoint], target: UtmZone) -> Result<Vec<(f64, f64)>> {
        let utm = build_proj(&target.to_proj_string())?;

        ring.iter()
            .map(|p| {
                let mut xyz = (p.longitude_deg.to_radians(), p.latitude_deg.to_radians(), 0.0);
                proj4rs::transform::transform(&self.wgs84, &utm, &mut xyz).map_err(|e| {
                    GeorefError::Projection(format!("EPSG:{} reprojection failed: {:?}", target.epsg(), e))
                })?;
                Ok((xyz.0, xyz.1))
            })
            .collect()
    }
}

fn build_proj(proj_string: &str) -> Result<Proj> {
    Proj::from_proj_string(proj_string)
        .map_err(|e| GeorefError::Projection(format!("failed to create projection '{}': {:?}", proj_string, e)))
}
