use wasm_bindgen::prelude::*;

use crate::crs::Proj4Provider;
use crate::document::{convert_document, AnnotationDocument, MetadataRecord};
use crate::error::GeorefError;
use crate::georeferencer::ConversionOptions;
use crate::jsonl::split_json_lines;
use crate::raster::{read_raster_dimensions, RasterLimits};
use crate::types::RasterDimensions;

fn to_js(error: GeorefError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Converts annotation documents of a single tile.
#[wasm_bindgen]
pub struct TileConverter {
    provider: Proj4Provider,
    metadata: MetadataRecord,
    limits: RasterLimits,
    mismatch_reported: bool,
}

#[wasm_bindgen]
impl TileConverter {
    /// Create a converter from the tile's metadata JSON
    #[wasm_bindgen(constructor)]
    pub fn new(metadata_json: &str) -> Result<TileConverter, JsValue> {
        let metadata = MetadataRecord::from_json(metadata_json).map_err(to_js)?;
        let provider = Proj4Provider::new().map_err(to_js)?;

        Ok(TileConverter {
            provider,
            metadata,
            limits: RasterLimits::default(),
            mismatch_reported: false,
        })
    }

    /// Cap the raster pixel count; `undefined` removes the cap (the default)
    #[wasm_bindgen]
    pub fn set_max_raster_pixels(&mut self, max_pixels: Option<u32>) {
        self.limits = match max_pixels {
            Some(max_pixels) => RasterLimits::capped(max_pixels as u64),
            None => RasterLimits::unlimited(),
        };
    }

    /// Convert using the dimensions read from the tile's TIFF bytes
    #[wasm_bindgen]
    pub fn convert(&mut self, annotation_json: &str, tiff_data: &[u8]) -> Result<String, JsValue> {
        let dimensions = read_raster_dimensions(tiff_data, self.limits).map_err(to_js)?;
        self.convert_with_dimensions(annotation_json, dimensions.width, dimensions.height)
    }

    /// Convert using raster dimensions known by the caller
    #[wasm_bindgen]
    pub fn convert_with_dimensions(
        &mut self,
        annotation_json: &str,
        width: u32,
        height: u32,
    ) -> Result<String, JsValue> {
        let annotation = AnnotationDocument::from_json(annotation_json).map_err(to_js)?;
        let conversion = convert_document(
            &self.provider,
            &self.metadata,
            &annotation,
            RasterDimensions::new(width, height),
            ConversionOptions::default(),
        )
        .map_err(to_js)?;

        self.mismatch_reported = conversion.dimension_mismatch.is_some();
        conversion.output.to_json_pretty().map_err(to_js)
    }

    /// Whether the last conversion saw declared and actual sizes disagree
    #[wasm_bindgen(getter)]
    pub fn dimension_mismatch(&self) -> bool {
        self.mismatch_reported
    }
}

/// Split a JSON-lines export; returns an array of `[image_stem, json]` pairs
#[wasm_bindgen]
pub fn split_jsonl(text: &str) -> Result<js_sys::Array, JsValue> {
    let records = split_json_lines(text).map_err(to_js)?;

    let out = js_sys::Array::new();
    for record in records {
        let pair = js_sys::Array::new();
        pair.push(&JsValue::from_str(&record.image_stem));
        pair.push(&JsValue::from_str(&record.document.to_string()));
        out.push(&pair);
    }
    Ok(out)
}
