use std::cell::{Cell as StdCell, RefCell};

use classify::{
    ClassificationOptions, Classifier, Error, FeatureMatrix, OutputSink, PredictionError, RasterDescriptor, TileSize, classify_raster,
    classify_tiled, indexedband,
};
use geo::{
    ArrayDataType, BandStatistics, Cell, DenseArray, GeoReference, GeoTransform, MemoryRaster, Raster, RasterReader, RasterSize,
    RasterWriter, Window,
};
use inf::{CancellationToken, ProgressNotification, progressinfo::DummyProgress};
use rand::Rng;

const BLOCK_5X4: [f64; 20] = [
    -1.0, 2.0, 3.0, -1.0, 5.0, //
    6.0, -1.0, 8.0, 9.0, -1.0, //
    -1.0, -1.0, 1.0, 2.0, 3.0, //
    4.0, 5.0, -1.0, 7.0, -1.0,
];

fn label_ones(features: &FeatureMatrix) -> Result<Vec<f64>, PredictionError> {
    Ok(vec![1.0; features.rows()])
}

fn first_column(features: &FeatureMatrix) -> Result<Vec<f64>, PredictionError> {
    Ok(features.iter_rows().map(|row| row[0]).collect())
}

fn in_memory_sink(desc: &RasterDescriptor, data_type: ArrayDataType, nodata: f64) -> classify::Result<OutputSink<MemoryRaster>> {
    OutputSink::create_in_memory(desc, data_type, nodata)
}

fn single_band(size: RasterSize, values: Vec<f64>) -> MemoryRaster {
    MemoryRaster::from_bands(size, ArrayDataType::Float32, vec![values])
        .unwrap()
        .with_georeference("EPSG:32631", GeoTransform::from_top_left_and_cell_size(600000.0, 5700000.0, 10.0, -10.0))
}

#[test_log::test]
fn codec_on_5x4_block() {
    let size = RasterSize::with_rows_cols(4, 5);
    let block = DenseArray::<f64>::new(size, BLOCK_5X4.to_vec()).unwrap();

    let (index, matrix) = indexedband::encode(&[block], -1.0).unwrap();
    assert_eq!(index.len(), 11);
    assert_eq!(matrix.rows(), 11);
    assert_eq!(
        &index[..5],
        &[
            Cell::from_row_col(0, 1),
            Cell::from_row_col(0, 2),
            Cell::from_row_col(0, 4),
            Cell::from_row_col(1, 0),
            Cell::from_row_col(1, 2)
        ]
    );
    assert_eq!(matrix.column(0).unwrap()[..5], [2.0, 3.0, 5.0, 6.0, 8.0]);

    let tile = indexedband::decode(&index, &vec![1.0; index.len()], size, 0.0).unwrap();
    let expected: Vec<f64> = BLOCK_5X4.iter().map(|&v| if v > -1.0 { 1.0 } else { 0.0 }).collect();
    assert_eq!(tile.as_slice(), expected.as_slice());
}

#[test_log::test]
fn classify_5x4_raster_in_partial_tiles() {
    let source = single_band(RasterSize::with_rows_cols(4, 5), BLOCK_5X4.to_vec());
    let options = ClassificationOptions::builder()
        .tile_size(TileSize::new(2, 3))
        .input_nodata(-1.0)
        .output_nodata(0.0)
        .output_data_type(ArrayDataType::Uint8)
        .build();

    let (output, summary) = classify_raster(&source, &label_ones, &options, &mut DummyProgress, in_memory_sink).unwrap();

    assert_eq!(summary.tiles_total, 6);
    assert_eq!(summary.tiles_written, 6);
    assert_eq!(summary.valid_pixels, 11);
    let expected: Vec<f64> = BLOCK_5X4.iter().map(|&v| if v > -1.0 { 1.0 } else { 0.0 }).collect();
    assert_eq!(output.band(1).unwrap(), expected.as_slice());

    assert_eq!(output.nodata(1).unwrap(), Some(0.0));
    assert_eq!(output.projection(), "EPSG:32631");
    assert_eq!(
        output.geo_transform(),
        GeoTransform::from_top_left_and_cell_size(600000.0, 5700000.0, 10.0, -10.0)
    );

    let stats = summary.statistics.unwrap();
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 1.0);
}

/// Destination that remembers the windows it received
struct RecordingWriter {
    raster: MemoryRaster,
    windows: Vec<Window>,
}

impl Raster for RecordingWriter {
    fn raster_size(&self) -> RasterSize {
        self.raster.raster_size()
    }

    fn band_count(&self) -> usize {
        self.raster.band_count()
    }
}

impl RasterWriter for RecordingWriter {
    fn set_georeference(&mut self, projection: &str, geo_transform: GeoTransform) -> geo::Result {
        self.raster.set_georeference(projection, geo_transform)
    }

    fn write_band_window<T: geo::ArrayNum>(&mut self, band_index: usize, window: Window, data: &DenseArray<T>) -> geo::Result {
        self.windows.push(window);
        self.raster.write_band_window(band_index, window, data)
    }

    fn set_nodata(&mut self, band_index: usize, nodata: f64) -> geo::Result {
        self.raster.set_nodata(band_index, nodata)
    }

    fn compute_statistics(&mut self, band_index: usize) -> geo::Result<Option<BandStatistics>> {
        self.raster.compute_statistics(band_index)
    }

    fn flush(&mut self) -> geo::Result {
        self.raster.flush()
    }
}

#[test_log::test]
fn large_raster_is_written_in_four_windows() {
    let size = RasterSize::with_rows_cols(700, 1000);
    let values = (0..size.cell_count()).map(|i| (i % 251) as f64).collect();
    let source = single_band(size, values);
    let descriptor = RasterDescriptor::describe(&source).unwrap();
    let options = ClassificationOptions::builder()
        .tile_size(TileSize::square(512))
        .input_nodata(0.0)
        .build();

    let writer = RecordingWriter {
        raster: MemoryRaster::new(size, 1, ArrayDataType::Float32, 0.0),
        windows: Vec::new(),
    };
    let sink = OutputSink::open(writer, &descriptor, ArrayDataType::Float32, 0.0).unwrap();
    let (writer, summary) = classify_tiled(&source, &descriptor, sink, &first_column, &options, &mut DummyProgress).unwrap();

    assert_eq!(
        writer.windows,
        vec![
            Window::new(0, 0, 512, 512),
            Window::new(512, 0, 488, 512),
            Window::new(0, 512, 512, 188),
            Window::new(512, 512, 488, 188),
        ]
    );
    assert_eq!(summary.tiles_written, 4);
    assert_eq!(writer.raster.band(1).unwrap(), source.band(1).unwrap());
}

#[test_log::test]
fn tiled_result_does_not_depend_on_tile_size() {
    let mut rng = rand::rng();
    let size = RasterSize::with_rows_cols(rng.random_range(20..60), rng.random_range(20..60));
    let band1: Vec<f64> = (0..size.cell_count())
        .map(|_| if rng.random_bool(0.3) { -9999.0 } else { rng.random_range(0.0..1.0) })
        .collect();
    let band2: Vec<f64> = (0..size.cell_count()).map(|_| rng.random_range(0.0..1.0)).collect();
    let source = MemoryRaster::from_bands(size, ArrayDataType::Float32, vec![band1.clone(), band2.clone()])
        .unwrap()
        .with_nodata(1, Some(-9999.0))
        .unwrap();

    let ndvi = |features: &FeatureMatrix| Ok::<_, PredictionError>(features.iter_rows().map(|row| row[2]).collect::<Vec<f64>>());
    let expected: Vec<f64> = band1
        .iter()
        .zip(&band2)
        .map(|(&a, &b)| if a > -9999.0 { classify::ndi::normalized_difference(a, b) } else { -9999.0 })
        .collect();

    for _ in 0..5 {
        let options = ClassificationOptions::builder()
            .tile_size(TileSize::new(rng.random_range(1..70), rng.random_range(1..70)))
            .band_combinations(vec![(1, 2)])
            .output_data_type(ArrayDataType::Float64)
            .build();

        let (output, summary) = classify_raster(&source, &ndvi, &options, &mut DummyProgress, in_memory_sink).unwrap();
        assert_eq!(output.band(1).unwrap(), expected.as_slice(), "tile size {}", options.tile_size);
        assert_eq!(summary.valid_pixels, band1.iter().filter(|&&v| v > -9999.0).count());
    }
}

#[test_log::test]
fn decode_is_independent_of_pair_order() {
    let size = RasterSize::with_rows_cols(4, 5);
    let block = DenseArray::<f64>::new(size, BLOCK_5X4.to_vec()).unwrap();
    let (index, matrix) = indexedband::encode(&[block.clone()], -1.0).unwrap();
    let labels = matrix.column(0).unwrap();

    let mut pairs: Vec<(Cell, f64)> = index.iter().copied().zip(labels.iter().copied()).collect();
    pairs.reverse();
    let (shuffled_index, shuffled_labels): (Vec<Cell>, Vec<f64>) = pairs.into_iter().unzip();

    let ordered = indexedband::decode(&index, &labels, size, -1.0).unwrap();
    let shuffled = indexedband::decode(&shuffled_index, &shuffled_labels, size, -1.0).unwrap();
    assert_eq!(ordered, shuffled);
    assert_eq!(ordered, block);
}

#[test_log::test]
fn integer_raster_without_nodata_uses_type_nodata() {
    let size = RasterSize::with_rows_cols(2, 2);
    let source = MemoryRaster::from_bands(size, ArrayDataType::Uint16, vec![vec![0.0, 10.0, 20.0, 30.0]]).unwrap();

    let (output, summary) = classify_raster(&source, &label_ones, &ClassificationOptions::default(), &mut DummyProgress, in_memory_sink).unwrap();
    assert_eq!(summary.valid_pixels, 4);
    assert_eq!(output.band(1).unwrap(), &[1.0; 4]);
    assert_eq!(output.nodata(1).unwrap(), Some(f64::from(u16::MAX)));
}

#[test_log::test]
fn explicit_output_nodata_must_fit_the_output_type() {
    let source = MemoryRaster::from_bands(RasterSize::with_rows_cols(1, 2), ArrayDataType::Uint16, vec![vec![1.0, 2.0]]).unwrap();
    let options = ClassificationOptions::builder().output_nodata(-1.0).build();

    assert!(matches!(
        classify_raster(&source, &label_ones, &options, &mut DummyProgress, in_memory_sink),
        Err(Error::Config(_))
    ));
}

#[test_log::test]
fn raster_without_valid_pixels() {
    let size = RasterSize::with_rows_cols(3, 3);
    let source = single_band(size, vec![-5.0; size.cell_count()]);
    let options = ClassificationOptions::builder()
        .tile_size(TileSize::square(2))
        .input_nodata(-5.0)
        .build();

    let (output, summary) = classify_raster(&source, &label_ones, &options, &mut DummyProgress, in_memory_sink).unwrap();
    assert_eq!(summary.tiles_written, 4);
    assert_eq!(summary.valid_pixels, 0);
    assert!(summary.statistics.is_none());
    assert_eq!(output.band(1).unwrap(), &[-5.0; 9]);
}

/// Requests cancellation once the given number of tiles completed
struct CancelAfter {
    tiles: u64,
    completed: u64,
    token: CancellationToken,
}

impl ProgressNotification for CancelAfter {
    fn tick(&mut self) {
        self.completed += 1;
        if self.completed == self.tiles {
            self.token.cancel();
        }
    }

    fn cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[test_log::test]
fn cancellation_leaves_valid_partial_output() {
    let size = RasterSize::with_rows_cols(4, 4);
    let source = single_band(size, (1..=16).map(f64::from).collect());
    let options = ClassificationOptions::builder()
        .tile_size(TileSize::square(2))
        .input_nodata(0.0)
        .build();

    let mut progress = CancelAfter {
        tiles: 2,
        completed: 0,
        token: CancellationToken::new(),
    };

    let (output, summary) = classify_raster(&source, &first_column, &options, &mut progress, in_memory_sink).unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.tiles_total, 4);
    assert_eq!(summary.tiles_written, 2);
    assert_eq!(
        output.band(1).unwrap(),
        &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    );
    assert_eq!(output.nodata(1).unwrap(), Some(0.0));
    assert_eq!(summary.statistics.unwrap().max, 8.0);
}

#[test_log::test]
fn cancelled_before_the_first_tile() {
    let size = RasterSize::with_rows_cols(2, 2);
    let source = single_band(size, vec![1.0; 4]);
    let token = CancellationToken::new();
    token.cancel();

    let mut progress = token.clone();
    let (output, summary) = classify_raster(&source, &label_ones, &ClassificationOptions::default(), &mut progress, in_memory_sink).unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.tiles_written, 0);
    assert!(output.band(1).unwrap().iter().all(|&v| v == classify::DEFAULT_NODATA));
}

#[test_log::test]
fn prediction_error_identifies_the_tile() {
    let size = RasterSize::with_rows_cols(4, 4);
    let mut values = vec![1.0; size.cell_count()];
    values[3 * 4 + 2] = 99.0;
    let source = single_band(size, values);
    let options = ClassificationOptions::builder()
        .tile_size(TileSize::square(2))
        .input_nodata(0.0)
        .build();

    let classifier = |features: &FeatureMatrix| {
        if features.as_slice().contains(&99.0) {
            return Err(PredictionError::Model("unexpected value".to_string()));
        }

        Ok(vec![1.0; features.rows()])
    };

    match classify_raster(&source, &classifier, &options, &mut DummyProgress, in_memory_sink) {
        Err(Error::Prediction { window, rows, cols, source }) => {
            assert_eq!(window, Window::new(2, 2, 2, 2));
            assert_eq!(rows, 4);
            assert_eq!(cols, 1);
            assert_eq!(source, PredictionError::Model("unexpected value".to_string()));
        }
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[test_log::test]
fn classifier_label_count_mismatch() {
    let source = single_band(RasterSize::with_rows_cols(2, 2), vec![1.0; 4]);
    let classifier = |_: &FeatureMatrix| Ok::<_, PredictionError>(vec![1.0]);

    assert!(matches!(
        classify_raster(&source, &classifier, &ClassificationOptions::default(), &mut DummyProgress, in_memory_sink),
        Err(Error::ShapeMismatch { index_len: 4, label_len: 1 })
    ));
}

/// Source that can fail reads and change its band count after a number of reads
struct FaultyReader {
    raster: MemoryRaster,
    reads: StdCell<usize>,
    fail_from_read: Option<usize>,
    extra_band_from_read: Option<usize>,
}

impl FaultyReader {
    fn new(raster: MemoryRaster) -> Self {
        FaultyReader {
            raster,
            reads: StdCell::new(0),
            fail_from_read: None,
            extra_band_from_read: None,
        }
    }

    fn reached(&self, limit: Option<usize>) -> bool {
        limit.is_some_and(|limit| self.reads.get() >= limit)
    }
}

impl Raster for FaultyReader {
    fn raster_size(&self) -> RasterSize {
        self.raster.raster_size()
    }

    fn band_count(&self) -> usize {
        self.raster.band_count() + usize::from(self.reached(self.extra_band_from_read))
    }
}

impl RasterReader for FaultyReader {
    fn data_type(&self, band_index: usize) -> geo::Result<ArrayDataType> {
        self.raster.data_type(band_index)
    }

    fn georeference(&self, band_index: usize) -> geo::Result<GeoReference> {
        self.raster.georeference(band_index)
    }

    fn block_size(&self, band_index: usize) -> geo::Result<RasterSize> {
        self.raster.block_size(band_index)
    }

    fn read_band_window<T: geo::ArrayNum>(&self, band_index: usize, window: Window) -> geo::Result<DenseArray<T>> {
        if self.reached(self.fail_from_read) {
            return Err(geo::Error::Runtime("disk on fire".to_string()));
        }

        self.reads.set(self.reads.get() + 1);
        self.raster.read_band_window(band_index, window)
    }
}

#[test_log::test]
fn read_error_identifies_the_tile() {
    let mut source = FaultyReader::new(single_band(RasterSize::with_rows_cols(2, 4), vec![1.0; 8]));
    source.fail_from_read = Some(1);
    let options = ClassificationOptions::builder().tile_size(TileSize::square(2)).build();

    match classify_raster(&source, &label_ones, &options, &mut DummyProgress, in_memory_sink) {
        Err(Error::Read { window, source }) => {
            assert_eq!(window, Window::new(2, 0, 2, 2));
            assert!(matches!(source, geo::Error::Runtime(_)));
        }
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[test_log::test]
fn band_count_change_aborts_the_run() {
    let mut source = FaultyReader::new(single_band(RasterSize::with_rows_cols(2, 4), vec![1.0; 8]));
    source.extra_band_from_read = Some(1);
    let options = ClassificationOptions::builder().tile_size(TileSize::square(2)).build();

    assert!(matches!(
        classify_raster(&source, &label_ones, &options, &mut DummyProgress, in_memory_sink),
        Err(Error::BandCountChanged { expected: 1, actual: 2 })
    ));
}

#[test_log::test]
fn configuration_errors_before_any_read() {
    let source = FaultyReader::new(single_band(RasterSize::with_rows_cols(2, 4), vec![1.0; 8]));
    let sink_created = RefCell::new(false);

    for options in [
        ClassificationOptions::builder().tile_size(TileSize::new(0, 2)).build(),
        ClassificationOptions::builder().tile_size(TileSize::new(2, -2)).build(),
        ClassificationOptions::builder().band_combinations(vec![(1, 2)]).build(),
    ] {
        let res = classify_raster(&source, &label_ones, &options, &mut DummyProgress, |desc, data_type, nodata| {
            *sink_created.borrow_mut() = true;
            in_memory_sink(desc, data_type, nodata)
        });

        assert!(matches!(res, Err(Error::Config(_))));
    }

    assert_eq!(source.reads.get(), 0);
    assert!(!*sink_created.borrow());
}

#[test_log::test]
fn raster_without_bands_cannot_be_described() {
    let source = MemoryRaster::new(RasterSize::with_rows_cols(2, 2), 0, ArrayDataType::Float32, 0.0);
    assert!(matches!(
        classify_raster(&source, &label_ones, &ClassificationOptions::default(), &mut DummyProgress, in_memory_sink),
        Err(Error::Describe(_))
    ));
}

#[test_log::test]
fn classifier_trait_objects() {
    let source = single_band(RasterSize::with_rows_cols(1, 3), vec![0.5, -1.0, 0.1]);
    let classifier: Box<dyn Classifier> = Box::new(classify::RangeClassifier::new(
        0,
        vec![classify::LabelRange::new(0.0, 0.3, 1.0), classify::LabelRange::new(0.3, 1.0, 2.0)],
        0.0,
    ));
    let options = ClassificationOptions::builder().input_nodata(-1.0).output_nodata(255.0).build();

    let (output, _) = classify_raster(&source, classifier.as_ref(), &options, &mut DummyProgress, in_memory_sink).unwrap();
    assert_eq!(output.band(1).unwrap(), &[2.0, 255.0, 1.0]);
}

#[cfg(feature = "gdal")]
mod geotiff {
    use geo::{GdalRaster, RasterFileFormat};

    use super::*;

    #[test_log::test]
    fn classify_geotiff() {
        let tmp = tempfile::tempdir().unwrap();
        let input_path = tmp.path().join("input.tif");
        let output_path = tmp.path().join("classified.tif");

        let size = RasterSize::with_rows_cols(40, 70);
        {
            let mut input = GdalRaster::create(&input_path, size, 2, ArrayDataType::Float32, RasterFileFormat::GeoTiff).unwrap();
            input
                .set_georeference("EPSG:31370", GeoTransform::from_top_left_and_cell_size(22000.0, 245000.0, 100.0, -100.0))
                .unwrap();
            let red = DenseArray::<f32>::from_f64_values(
                size,
                &(0..size.cell_count())
                    .map(|i| if i % 7 == 0 { -1.0 } else { 0.1 })
                    .collect::<Vec<_>>(),
            )
            .unwrap();
            let nir = DenseArray::<f32>::filled_with(0.5, size);
            input.write_band_window(1, Window::covering(size), &red).unwrap();
            input.write_band_window(2, Window::covering(size), &nir).unwrap();
            input.set_nodata(1, -1.0).unwrap();
            input.flush().unwrap();
        }

        let input = GdalRaster::open_read_only(&input_path).unwrap();
        let classifier = classify::RangeClassifier::new(2, vec![classify::LabelRange::new(0.5, 1.0, 2.0)], 1.0);
        let options = ClassificationOptions::builder()
            .tile_size(TileSize::new(32, 16))
            .band_combinations(vec![(2, 1)])
            .output_data_type(ArrayDataType::Uint8)
            .output_nodata(0.0)
            .build();

        let (output, summary) = classify_raster(&input, &classifier, &options, &mut DummyProgress, |desc, data_type, nodata| {
            OutputSink::create(&output_path, desc, data_type, nodata)
        })
        .unwrap();
        drop(output);

        assert_eq!(summary.tiles_total, 9);
        assert_eq!(summary.valid_pixels, size.cell_count() - size.cell_count().div_ceil(7));

        let classified = GdalRaster::open_read_only(&output_path).unwrap();
        assert_eq!(classified.data_type(1).unwrap(), ArrayDataType::Uint8);
        assert_eq!(classified.georeference(1).unwrap().nodata(), Some(0.0));

        let labels = classified.read_band_window::<u8>(1, Window::covering(size)).unwrap();
        for (i, &label) in labels.iter().enumerate() {
            // ndvi of (0.5, 0.1) is 0.67
            let expected = if i % 7 == 0 { 0 } else { 2 };
            assert_eq!(label, expected, "pixel {i}");
        }
    }
}
