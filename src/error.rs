use thiserror::Error;

/// Errors raised while georeferencing a tile.
///
/// Degenerate polygons and raster/metadata dimension mismatches are not
/// errors: the former are filtered, the latter reported alongside the result.
#[derive(Debug, Error)]
pub enum GeorefError {
    #[error("Invalid projection parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Projection failed: {0}")]
    Projection(String),

    #[error("Failed to read raster: {0}")]
    Raster(String),

    #[error("Invalid raster file: {0}")]
    InvalidRaster(String),

    #[error("Metadata not found for {image_id}")]
    MissingMetadata { image_id: String },

    #[error("Malformed annotation in {image_id}: {reason}")]
    MalformedAnnotation { image_id: String, reason: String },

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GeorefError>;

impl GeorefError {
    /// True for failures caused by the tile's own projection parameters.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GeorefError::InvalidParameter { .. } | GeorefError::Projection(_))
    }
}
