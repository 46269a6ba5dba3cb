use wasm_bindgen::prelude::*;

pub mod batch;
pub mod crs;
pub mod displacement;
pub mod document;
mod error;
pub mod georeferencer;
pub mod jsonl;
mod logging;
pub mod projection_resolver;
pub mod raster;
mod tile_converter;
pub mod types;
mod utils;

pub use batch::{BatchConverter, BatchReport, RasterSource, TileFailure, TileJob};
pub use crs::{CoordinateSystemProvider, Proj4Provider, UtmZone};
pub use displacement::{displace, origin_from_center, point_from_origin, EARTH_UNIT_LENGTH_M};
pub use document::{convert_document, AnnotationDocument, Conversion, DimensionMismatch, MetadataRecord, OutputDocument};
pub use error::{GeorefError, Result};
pub use georeferencer::{georeference, polygon_area, ConversionOptions, TileFrame};
pub use jsonl::{split_json_lines, JsonRecord};
pub use logging::init_console_logger;
pub use projection_resolver::{resolve_tile, resolve_tile_center};
pub use raster::{read_raster_dimensions, RasterLimits};
pub use tile_converter::*;
pub use types::*;
pub use utils::*;

// Initialize WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    init_console_logger();
    log::info!("Orthophoto georeferencer WASM module initialized");
}
