use crate::crs::CoordinateSystemProvider;
use crate::document::{convert_document, AnnotationDocument, Conversion, MetadataRecord};
use crate::error::{GeorefError, Result};
use crate::georeferencer::ConversionOptions;
use crate::raster::{read_raster_dimensions, RasterLimits};
use crate::types::RasterDimensions;

/// Where a tile's pixel dimensions come from.
#[derive(Debug, Clone)]
pub enum RasterSource {
    Dimensions(RasterDimensions),
    Tiff(Vec<u8>),
}

/// Everything needed to convert one image.
#[derive(Debug, Clone)]
pub struct TileJob {
    pub annotation: AnnotationDocument,
    pub metadata: Option<MetadataRecord>,
    pub raster: RasterSource,
}

#[derive(Debug)]
pub struct TileFailure {
    pub image_id: String,
    pub error: GeorefError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<Conversion>,
    /// Image ids without a metadata record
    pub skipped: Vec<String>,
    pub failed: Vec<TileFailure>,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        format!(
            "{} converted, {} skipped, {} failed",
            self.converted.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

/// Converts tiles one after another; a failing tile never stops the batch.
pub struct BatchConverter<'a> {
    provider: &'a dyn CoordinateSystemProvider,
    options: ConversionOptions,
    limits: RasterLimits,
}

impl<'a> BatchConverter<'a> {
    pub fn new(provider: &'a dyn CoordinateSystemProvider) -> Self {
        BatchConverter {
            provider,
            options: ConversionOptions::default(),
            limits: RasterLimits::default(),
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_raster_limits(mut self, limits: RasterLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn convert(&self, job: &TileJob) -> Result<Conversion> {
        let metadata = job.metadata.as_ref().ok_or_else(|| GeorefError::MissingMetadata {
            image_id: job.annotation.image_stem().to_string(),
        })?;

        let dimensions = match &job.raster {
            RasterSource::Dimensions(dimensions) => *dimensions,
            RasterSource::Tiff(data) => read_raster_dimensions(data, self.limits)?,
        };

        convert_document(self.provider, metadata, &job.annotation, dimensions, self.options)
    }

    pub fn run<I>(&self, jobs: I) -> BatchReport
    where
        I: IntoIterator<Item = TileJob>,
    {
        let mut report = BatchReport::default();

        for job in jobs {
            let image_id = job.annotation.image_id.clone();
            log::info!("Processing {}...", image_id);

            match self.convert(&job) {
                Ok(conversion) => report.converted.push(conversion),
                Err(GeorefError::MissingMetadata { image_id }) => {
                    log::warn!("Metadata not found for {}. Skipping.", image_id);
                    report.skipped.push(image_id);
                }
                Err(error) => {
                    log::warn!("Skipping {}: {}", image_id, error);
                    report.failed.push(TileFailure { image_id, error });
                }
            }
        }

        log::info!("Batch finished: {}", report.summary());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::Proj4Provider;
    use crate::document::{ImageSize, PanelEntry, ShapeAttributes};
    use std::io::Cursor;
    use tiff::encoder::{colortype, TiffEncoder};

    fn metadata() -> MetadataRecord {
        MetadataRecord {
            lat_0: 38.0,
            lon_0: 127.0,
            x_0: 200000.0,
            y_0: 600000.0,
            x_tm: 228580.0,
            y_tm: 419031.0,
            image_resolution: 0.11,
        }
    }

    fn job(image_id: &str, metadata: Option<MetadataRecord>, raster: RasterSource) -> TileJob {
        TileJob {
            annotation: AnnotationDocument {
                image_id: image_id.to_string(),
                image_size: ImageSize::new(1000, 1000),
                panel: vec![PanelEntry {
                    shape_attributes: ShapeAttributes {
                        all_points_x: vec![100.0, 200.0, 200.0, 100.0],
                        all_points_y: vec![100.0, 100.0, 200.0, 200.0],
                    },
                }],
            },
            metadata,
            raster,
        }
    }

    #[test]
    fn test_failures_do_not_abort_batch() {
        let provider = Proj4Provider::new().unwrap();
        let mut broken = metadata();
        broken.image_resolution = 0.0;

        let dims = RasterSource::Dimensions(RasterDimensions::new(1000, 1000));
        let jobs = vec![
            job("a.tif", Some(metadata()), dims.clone()),
            job("b.tif", None, dims.clone()),
            job("c.tif", Some(broken), dims.clone()),
            job("d.tif", Some(metadata()), RasterSource::Tiff(b"not a tiff".to_vec())),
            job("e.tif", Some(metadata()), dims),
        ];

        let report = BatchConverter::new(&provider).run(jobs);

        assert_eq!(report.converted.len(), 2);
        assert_eq!(report.converted[0].output.image_id, "a.tif");
        assert_eq!(report.converted[1].output.image_id, "e.tif");
        assert_eq!(report.skipped, vec!["b".to_string()]);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed[0].error.is_configuration());
        assert!(matches!(report.failed[1].error, GeorefError::InvalidRaster(_)));
        assert_eq!(report.summary(), "2 converted, 1 skipped, 2 failed");
    }

    fn gray_tiff(width: u32, height: u32) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut cursor).unwrap();
            let pixels = vec![0u8; (width * height) as usize];
            encoder.write_image::<colortype::Gray8>(width, height, &pixels).unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_large_raster_converts_by_default() {
        let provider = Proj4Provider::new().unwrap();
        let tiff = RasterSource::Tiff(gray_tiff(1000, 1000));

        let conversion = BatchConverter::new(&provider)
            .convert(&job("big.tif", Some(metadata()), tiff.clone()))
            .unwrap();
        assert_eq!(conversion.output.panel.len(), 1);
        assert!(conversion.dimension_mismatch.is_none());

        // a pixel cap is only enforced when asked for
        let capped = BatchConverter::new(&provider).with_raster_limits(RasterLimits::capped(500_000));
        let result = capped.convert(&job("big.tif", Some(metadata()), tiff));
        assert!(matches!(result, Err(GeorefError::Raster(_))));
    }

    #[test]
    fn test_min_ring_points_option() {
        let provider = Proj4Provider::new().unwrap();
        let converter = BatchConverter::new(&provider).with_options(ConversionOptions { min_ring_points: 5 });
        let conversion = converter
            .convert(&job(
                "a",
                Some(metadata()),
                RasterSource::Dimensions(RasterDimensions::new(1000, 1000)),
            ))
            .unwrap();
        assert!(conversion.output.panel.is_empty());
    }
}
