//! Tiled classification of a raster.
//!
//! The raster is processed one window at a time: the bands of the window are read and encoded,
//! the valid pixels are classified and the labels are scattered back into a tile that is written
//! to the [`OutputSink`]. Memory use is bounded by the tile size, never by the raster size.

use bon::bon;
use geo::{ArrayDataType, BandStatistics, DenseArray, RasterReader, RasterWriter, Window};
use inf::{ProgressNotification, duration::Recorder};

use crate::{
    Classifier, Error, OutputSink, RasterDescriptor, Result, TileScheduler, TileSize, indexedband,
    ndi::{self, BandPair},
};

/// Validity threshold used when neither the options nor the raster define a nodata value
pub const DEFAULT_NODATA: f64 = -3.40282e38;

/// Explicit parameters of a classification run
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOptions {
    pub tile_size: TileSize,
    /// Pixels of the first band at or below this value are not classified, defaults to the nodata value of the first band
    pub input_nodata: Option<f64>,
    /// Nodata and fill value of the output, defaults to the input nodata value if the output data type can represent it
    pub output_nodata: Option<f64>,
    /// Data type of the output, defaults to the data type of the first band
    pub output_data_type: Option<ArrayDataType>,
    /// Only use the first bands of the raster
    pub max_bands: Option<usize>,
    /// Normalized difference features appended to the band values
    pub band_combinations: Vec<BandPair>,
}

#[bon]
impl ClassificationOptions {
    #[builder]
    pub fn new(
        #[builder(default)] tile_size: TileSize,
        input_nodata: Option<f64>,
        output_nodata: Option<f64>,
        output_data_type: Option<ArrayDataType>,
        max_bands: Option<usize>,
        #[builder(default)] band_combinations: Vec<BandPair>,
    ) -> Self {
        ClassificationOptions {
            tile_size,
            input_nodata,
            output_nodata,
            output_data_type,
            max_bands,
            band_combinations,
        }
    }

    /// Checks that do not need the raster
    pub fn validate(&self) -> Result {
        self.tile_size.validate()?;
        if self.max_bands == Some(0) {
            return Err(Error::Config("The maximum number of bands must be at least 1".to_string()));
        }

        Ok(())
    }

    /// The number of bands that take part in the classification
    pub fn used_band_count(&self, descriptor: &RasterDescriptor) -> Result<usize> {
        self.validate()?;

        let band_count = self.max_bands.map_or(descriptor.band_count(), |max| max.min(descriptor.band_count()));
        if let Some(&(a, b)) = self
            .band_combinations
            .iter()
            .find(|&&(a, b)| a == 0 || b == 0 || a > band_count || b > band_count)
        {
            return Err(Error::Config(format!(
                "Band combination ({a}, {b}) refers to a band outside of the {band_count} used bands"
            )));
        }

        Ok(band_count)
    }

    pub fn input_nodata(&self, descriptor: &RasterDescriptor) -> f64 {
        self.input_nodata.or(descriptor.nodata()).unwrap_or(DEFAULT_NODATA)
    }

    /// The configured output nodata value, otherwise the input nodata value when the output data type can represent it,
    /// otherwise the default nodata value of the output data type
    pub fn output_nodata(&self, descriptor: &RasterDescriptor) -> f64 {
        if let Some(nodata) = self.output_nodata {
            return nodata;
        }

        let nodata = self.input_nodata(descriptor);
        let data_type = self.output_data_type(descriptor);
        if data_type.fits(nodata) {
            nodata
        } else {
            let type_nodata = data_type.default_nodata_value();
            log::debug!("Input nodata {nodata} does not fit the output type {data_type}, using {type_nodata}");
            type_nodata
        }
    }

    pub fn output_data_type(&self, descriptor: &RasterDescriptor) -> ArrayDataType {
        self.output_data_type.unwrap_or(descriptor.data_type())
    }
}

impl Default for ClassificationOptions {
    fn default() -> Self {
        ClassificationOptions::builder().build()
    }
}

/// Outcome of a classification run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationSummary {
    pub tiles_total: usize,
    pub tiles_written: usize,
    pub valid_pixels: usize,
    pub cancelled: bool,
    pub statistics: Option<BandStatistics>,
}

impl std::fmt::Display for ClassificationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} tiles, {} classified pixels",
            self.tiles_written, self.tiles_total, self.valid_pixels
        )?;

        if self.cancelled {
            write!(f, " (cancelled)")?;
        }

        Ok(())
    }
}

/// Classify the valid pixels of the band blocks of a single window.
/// Returns the output tile and the number of classified pixels.
pub fn classify_tile<C: Classifier + ?Sized>(
    band_blocks: &[DenseArray<f64>],
    window: Window,
    nodata: f64,
    fill: f64,
    classifier: &C,
    band_combinations: &[BandPair],
) -> Result<(DenseArray<f64>, usize)> {
    let (index, mut features) = indexedband::encode(band_blocks, nodata)?;
    if index.is_empty() {
        log::debug!("Tile {window}: no valid pixels");
        return Ok((DenseArray::filled_with(fill, window.size()), 0));
    }

    ndi::append_normalized_differences(&mut features, band_combinations)?;

    let labels = classifier.predict(&features).map_err(|source| Error::Prediction {
        window,
        rows: features.rows(),
        cols: features.columns(),
        source,
    })?;

    log::debug!("Tile {window}: {} valid pixels", index.len());
    let tile = indexedband::decode(&index, &labels, window.size(), fill)?;
    Ok((tile, index.len()))
}

/// Run the tile loop of a classification on an opened output sink.
///
/// Tiles are processed in row-major order. Cancellation is checked before every tile, a cancelled run
/// still finalizes the output so the tiles written so far are valid. On error the run stops
/// immediately, tiles that were already written remain in the destination.
pub fn classify_tiled<R, W, C>(
    reader: &R,
    descriptor: &RasterDescriptor,
    mut sink: OutputSink<W>,
    classifier: &C,
    options: &ClassificationOptions,
    progress: &mut impl ProgressNotification,
) -> Result<(W, ClassificationSummary)>
where
    R: RasterReader,
    W: RasterWriter,
    C: Classifier + ?Sized,
{
    let band_count = options.used_band_count(descriptor)?;
    let scheduler = TileScheduler::new(descriptor.raster_size(), options.tile_size)?;
    let nodata = options.input_nodata(descriptor);
    let fill = options.output_nodata(descriptor);

    let recorder = Recorder::new();
    let mut summary = ClassificationSummary {
        tiles_total: scheduler.window_count(),
        ..Default::default()
    };

    log::info!(
        "Classify {descriptor} using {band_count} band(s) in {} tiles of {}",
        summary.tiles_total,
        options.tile_size
    );
    progress.reset(summary.tiles_total as u64);

    for window in scheduler {
        if progress.cancelled() {
            log::warn!("Classification cancelled after {} of {} tiles", summary.tiles_written, summary.tiles_total);
            summary.cancelled = true;
            break;
        }

        if reader.band_count() != descriptor.band_count() {
            return Err(Error::BandCountChanged {
                expected: descriptor.band_count(),
                actual: reader.band_count(),
            });
        }

        let band_blocks = (1..=band_count)
            .map(|band_index| {
                reader
                    .read_band_window::<f64>(band_index, window)
                    .map_err(|source| Error::Read { window, source })
            })
            .collect::<Result<Vec<_>>>()?;

        let (tile, valid_pixels) = classify_tile(&band_blocks, window, nodata, fill, classifier, &options.band_combinations)?;
        sink.write_tile(&tile, window)?;

        summary.tiles_written = sink.tiles_written();
        summary.valid_pixels += valid_pixels;
        progress.tick();
    }

    let (writer, statistics) = sink.finalize(fill)?;
    summary.statistics = statistics;

    log::info!("Classification done: {summary} ({})", recorder.elapsed_time_string());
    Ok((writer, summary))
}

/// Complete classification run: validate the options, describe the source, create the destination
/// and run the tile loop.
/// `create_sink` receives the source description, the output data type and the output nodata value.
pub fn classify_raster<R, W, C, F>(
    reader: &R,
    classifier: &C,
    options: &ClassificationOptions,
    progress: &mut impl ProgressNotification,
    create_sink: F,
) -> Result<(W, ClassificationSummary)>
where
    R: RasterReader,
    W: RasterWriter,
    C: Classifier + ?Sized,
    F: FnOnce(&RasterDescriptor, ArrayDataType, f64) -> Result<OutputSink<W>>,
{
    options.validate()?;

    let descriptor = RasterDescriptor::describe(reader)?;
    options.used_band_count(&descriptor)?;

    let sink = create_sink(&descriptor, options.output_data_type(&descriptor), options.output_nodata(&descriptor))?;
    classify_tiled(reader, &descriptor, sink, classifier, options, progress)
}
