use crate::crs::CoordinateSystemProvider;
use crate::error::Result;
use crate::types::{GeoPoint, ProjectionParameters, TileMetadata};

/// Resolve a projected tile coordinate to latitude/longitude.
///
/// Inverse transverse Mercator on the parameters' ellipsoid; both axes are
/// rounded to 8 decimals so downstream values match the published outputs.
///
/// # Errors
/// `InvalidParameter` when the parameters are inconsistent (non-finite,
/// `scale_factor <= 0`, reference point out of range), `Projection` when the
/// provider fails.
pub fn resolve_tile_center(
    provider: &dyn CoordinateSystemProvider,
    params: &ProjectionParameters,
    easting_m: f64,
    northing_m: f64,
) -> Result<GeoPoint> {
    params.validate()?;
    let center = provider.inverse(params, easting_m, northing_m)?.rounded();

    log::debug!(
        "Resolved ({}, {}) to {}",
        easting_m,
        northing_m,
        crate::utils::format_coordinate(center)
    );

    Ok(center)
}

/// [`resolve_tile_center`] for a tile's declared center coordinate.
pub fn resolve_tile(provider: &dyn CoordinateSystemProvider, tile: &TileMetadata) -> Result<GeoPoint> {
    tile.validate()?;
    resolve_tile_center(provider, &tile.projection, tile.tile_easting_m, tile.tile_northing_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::{Proj4Provider, UtmZone};
    use crate::error::GeorefError;
    use std::cell::Cell;

    struct CountingProvider {
        calls: Cell<usize>,
    }

    impl CoordinateSystemProvider for CountingProvider {
        fn forward(&self, _: &ProjectionParameters, _: GeoPoint) -> Result<(f64, f64)> {
            unreachable!()
        }

        fn inverse(&self, _: &ProjectionParameters, _: f64, _: f64) -> Result<GeoPoint> {
            self.calls.set(self.calls.get() + 1);
            Ok(GeoPoint::new(36.123456789, 127.000000004))
        }

        fn reproject(&self, _: &[GeoPoint], _: UtmZone) -> Result<Vec<(f64, f64)>> {
            unreachable!()
        }
    }

    #[test]
    fn test_end_to_end_scenario_center() {
        let provider = Proj4Provider::new().unwrap();
        let params = ProjectionParameters::new(38.0, 127.0, 200000.0, 600000.0);
        let center = resolve_tile_center(&provider, &params, 228580.0, 419031.0).unwrap();

        // ~181 km south and ~28.6 km east of the reference point
        assert!((center.latitude_deg - 36.369).abs() < 0.01, "lat {}", center.latitude_deg);
        assert!((center.longitude_deg - 127.31).abs() < 0.01, "lon {}", center.longitude_deg);
    }

    #[test]
    fn test_output_is_rounded() {
        let provider = CountingProvider { calls: Cell::new(0) };
        let params = ProjectionParameters::new(38.0, 127.0, 200000.0, 600000.0);
        let center = resolve_tile_center(&provider, &params, 0.0, 0.0).unwrap();

        assert_eq!(provider.calls.get(), 1);
        assert_eq!(center.latitude_deg, 36.12345679);
        assert_eq!(center.longitude_deg, 127.0);
    }

    #[test]
    fn test_invalid_parameters_never_reach_provider() {
        let provider = CountingProvider { calls: Cell::new(0) };
        let mut params = ProjectionParameters::new(38.0, 127.0, 200000.0, 600000.0);
        params.scale_factor = 0.0;

        let result = resolve_tile_center(&provider, &params, 228580.0, 419031.0);
        assert!(matches!(result, Err(GeorefError::InvalidParameter { .. })));
        assert_eq!(provider.calls.get(), 0);
    }

    #[test]
    fn test_round_trip_through_rounded_center() {
        let provider = Proj4Provider::new().unwrap();
        let params = ProjectionParameters::new(38.0, 127.0, 200000.0, 600000.0);
        let center = resolve_tile_center(&provider, &params, 228580.0, 419031.0).unwrap();
        let (e, n) = provider.forward(&params, center).unwrap();

        // 8 decimals of a degree is about a millimeter on the ground
        assert!((e - 228580.0).abs() < 0.01);
        assert!((n - 419031.0).abs() < 0.01);
    }
}
