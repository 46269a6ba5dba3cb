use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::crs::CoordinateSystemProvider;
use crate::error::{GeorefError, Result};
use crate::georeferencer::{georeference, ConversionOptions};
use crate::types::{AnnotationPolygon, GeoreferencedPolygon, ProjectionParameters, RasterDimensions, TileMetadata};

/// Per-tile metadata file: `{lat_0, lon_0, x_0, y_0, x_tm, y_tm, image_resolution}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub lat_0: f64,
    pub lon_0: f64,
    pub x_0: f64,
    pub y_0: f64,
    pub x_tm: f64,
    pub y_tm: f64,
    pub image_resolution: f64,
}

impl MetadataRecord {
    pub fn from_json(json: &str) -> Result<MetadataRecord> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<&MetadataRecord> for TileMetadata {
    fn from(record: &MetadataRecord) -> TileMetadata {
        TileMetadata {
            projection: ProjectionParameters::new(record.lat_0, record.lon_0, record.x_0, record.y_0),
            tile_easting_m: record.x_tm,
            tile_northing_m: record.y_tm,
            pixel_resolution_m: record.image_resolution,
        }
    }
}

/// Declared image size. Informational only: any JSON number is accepted and
/// echoed back unchanged in the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: Number,
    pub height: Number,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> ImageSize {
        ImageSize {
            width: Number::from(width),
            height: Number::from(height),
        }
    }

    /// True when the declared size equals the raster's pixel size.
    pub fn matches(&self, actual: RasterDimensions) -> bool {
        self.width.as_f64() == Some(actual.width as f64) && self.height.as_f64() == Some(actual.height as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeAttributes {
    pub all_points_x: Vec<f64>,
    pub all_points_y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelEntry {
    pub shape_attributes: ShapeAttributes,
}

/// Pixel-space annotations of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    pub image_id: String,
    pub image_size: ImageSize,
    #[serde(default)]
    pub panel: Vec<PanelEntry>,
}

impl AnnotationDocument {
    pub fn from_json(json: &str) -> Result<AnnotationDocument> {
        Ok(serde_json::from_str(json)?)
    }

    /// Image id without a trailing `.tif`; names the raster and metadata files.
    pub fn image_stem(&self) -> &str {
        image_stem(&self.image_id)
    }

    pub fn polygons(&self) -> Result<Vec<AnnotationPolygon>> {
        self.panel
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let shape = &entry.shape_attributes;
                AnnotationPolygon::from_parallel(&shape.all_points_x, &shape.all_points_y).ok_or_else(|| {
                    GeorefError::MalformedAnnotation {
                        image_id: self.image_id.clone(),
                        reason: format!(
                            "panel {} has {} x and {} y coordinates",
                            index,
                            shape.all_points_x.len(),
                            shape.all_points_y.len()
                        ),
                    }
                })
            })
            .collect()
    }
}

pub fn image_stem(image_id: &str) -> &str {
    image_id.strip_suffix(".tif").unwrap_or(image_id)
}

/// Georeferenced attributes of one panel.
///
/// `all_points_x` carries the latitudes and `all_points_y` the longitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoShapeAttributes {
    pub all_points_x: Vec<f64>,
    pub all_points_y: Vec<f64>,
    pub mean_point_latitude: f64,
    pub mean_point_longitude: f64,
    pub shape_area_m2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPanelEntry {
    pub shape_attributes: GeoShapeAttributes,
}

impl From<&GeoreferencedPolygon> for GeoPanelEntry {
    fn from(polygon: &GeoreferencedPolygon) -> GeoPanelEntry {
        GeoPanelEntry {
            shape_attributes: GeoShapeAttributes {
                all_points_x: polygon.ring.iter().map(|p| p.latitude_deg).collect(),
                all_points_y: polygon.ring.iter().map(|p| p.longitude_deg).collect(),
                mean_point_latitude: polygon.centroid.latitude_deg,
                mean_point_longitude: polygon.centroid.longitude_deg,
                shape_area_m2: polygon.area_m2,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub image_id: String,
    pub image_size: ImageSize,
    pub panel: Vec<GeoPanelEntry>,
}

impl OutputDocument {
    /// `<image_id>_output.json`
    pub fn file_name(&self) -> String {
        format!("{}_output.json", self.image_id)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Declared `image_size` disagrees with the raster actually read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub declared: ImageSize,
    pub actual: RasterDimensions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub output: OutputDocument,
    pub dimension_mismatch: Option<DimensionMismatch>,
}

/// Georeference one annotation document.
///
/// Geometry always uses `actual` raster dimensions; a disagreement with the
/// declared size is returned in [`Conversion::dimension_mismatch`].
pub fn convert_document(
    provider: &dyn CoordinateSystemProvider,
    metadata: &MetadataRecord,
    annotation: &AnnotationDocument,
    actual: RasterDimensions,
    options: ConversionOptions,
) -> Result<Conversion> {
    let declared = &annotation.image_size;
    let dimension_mismatch = if !declared.matches(actual) {
        log::warn!(
            "{}: declared size {}x{} differs from raster size {}x{}",
            annotation.image_id,
            declared.width,
            declared.height,
            actual.width,
            actual.height
        );
        Some(DimensionMismatch {
            declared: declared.clone(),
            actual,
        })
    } else {
        None
    };

    let polygons = annotation.polygons()?;
    let tile = TileMetadata::from(metadata);
    let georeferenced = georeference(provider, &tile, actual, &polygons, options)?;

    Ok(Conversion {
        output: OutputDocument {
            image_id: annotation.image_id.clone(),
            image_size: annotation.image_size.clone(),
            panel: georeferenced.iter().map(GeoPanelEntry::from).collect(),
        },
        dimension_mismatch,
    })
}
