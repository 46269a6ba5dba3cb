use std::io::Cursor;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tiff::decoder::{Decoder, Limits};

use crate::error::{GeorefError, Result};
use crate::types::RasterDimensions;

const TIFF_MAGIC: u16 = 42;
const BIGTIFF_MAGIC: u16 = 43;

/// Size cap applied when reading a tile raster.
///
/// Orthophoto tiles are routinely huge and only the header is read, so the
/// default is unlimited; a pixel cap is opt-in through [`RasterLimits::capped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterLimits {
    pub max_pixels: u64,
    pub unlimited: bool,
}

impl Default for RasterLimits {
    fn default() -> Self {
        RasterLimits::unlimited()
    }
}

impl RasterLimits {
    pub fn unlimited() -> Self {
        RasterLimits {
            max_pixels: u64::MAX,
            unlimited: true,
        }
    }

    /// Reject rasters with more than `max_pixels` pixels.
    pub fn capped(max_pixels: u64) -> Self {
        RasterLimits {
            max_pixels,
            unlimited: false,
        }
    }

    fn decoder_limits(&self) -> Limits {
        if self.unlimited {
            Limits::unlimited()
        } else {
            Limits::default()
        }
    }
}

/// Check the byte order mark and magic number of a TIFF/BigTIFF file.
pub fn validate_tiff_header(data: &[u8]) -> Result<()> {
    if data.len() < 8 {
        return Err(GeorefError::InvalidRaster("file too small".to_string()));
    }

    let magic = match &data[0..2] {
        b"II" => LittleEndian::read_u16(&data[2..4]),
        b"MM" => BigEndian::read_u16(&data[2..4]),
        _ => return Err(GeorefError::InvalidRaster("missing TIFF byte order mark".to_string())),
    };

    if magic != TIFF_MAGIC && magic != BIGTIFF_MAGIC {
        return Err(GeorefError::InvalidRaster(format!("unexpected TIFF magic number {}", magic)));
    }

    Ok(())
}

/// Width and height of a TIFF raster, read from its first IFD.
///
/// Pixel data is never decoded.
pub fn read_raster_dimensions(data: &[u8], limits: RasterLimits) -> Result<RasterDimensions> {
    validate_tiff_header(data)?;

    let decoder = Decoder::new(Cursor::new(data))
        .map_err(|e| GeorefError::Raster(e.to_string()))?;
    let mut decoder = decoder.with_limits(limits.decoder_limits());

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| GeorefError::Raster(format!("failed to get image dimensions: {}", e)))?;
    let dimensions = RasterDimensions::new(width, height);

    if !limits.unlimited && dimensions.pixel_count() > limits.max_pixels {
        return Err(GeorefError::Raster(format!(
            "image of {}x{} px exceeds the limit of {} pixels",
            width, height, limits.max_pixels
        )));
    }

    Ok(dimensions)
}
